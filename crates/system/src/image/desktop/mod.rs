pub mod toolbox;
pub mod vscode;
pub mod zoom;

use std::path::Path;

use crate::plan::Plan;
use crate::plan::pipeline::CommandSpec;

pub use toolbox::{ToolboxImage, ToolboxInfo};
pub use vscode::{VsCodeConfig, VsCodeImage, VsCodeInfo};
pub use zoom::{ZoomImage, ZoomInfo};

/// Unpack a vendor tarball into `dest`, dropping its top-level directory
pub(crate) fn extract_tarball(tarball: &Path, dest: &Path) -> Plan {
    Plan::new()
        .step(CommandSpec::new("mkdir").arg("-p").arg_path(dest))
        .step(
            CommandSpec::new("tar")
                .arg("-xzf")
                .arg_path(tarball)
                .arg("-C")
                .arg_path(dest)
                .arg("--strip-components=1"),
        )
}
