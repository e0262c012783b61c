//! Development toolchains installed at user level (rustup, sdkman, nvm,
//! miniconda) or system wide (Go).

pub mod go;
pub mod miniconda;
pub mod nvm;
pub mod rust;
pub mod sdkman;

use std::path::Path;

use crate::plan::pipeline::{CommandSpec, Pipeline};

pub use go::{GoImage, GoInfo};
pub use miniconda::{MinicondaConfig, MinicondaImage, MinicondaInfo};
pub use nvm::{NodeImage, NodeInfo, NvmImage, NvmInfo};
pub use rust::{RustConfig, RustImage};
pub use sdkman::{GradleImage, GradleInfo, JavaImage, JavaInfo, SdkmanImage};

/// `curl <flags> <url> | <shell...>`, the usual way vendors ship installers
pub(crate) fn curl_into(url: &str, flags: &[&str], shell: CommandSpec) -> Pipeline {
    Pipeline::new(CommandSpec::new("curl").args(flags.iter().copied()).arg(url)).pipe(shell)
}

/// Run `command` after sourcing the init script of a user-level version
/// manager such as sdkman or nvm
pub(crate) fn with_init_script(init: &Path, command: &str) -> Pipeline {
    Pipeline::bash(format!("source {} && {command}", init.display()))
}

pub(crate) fn remove_dir(path: &Path) -> CommandSpec {
    CommandSpec::new("rm").arg("-rf").arg_path(path)
}
