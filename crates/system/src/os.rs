use std::path::Path;

use anyhow::Context;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OsArch {
    X64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinuxType {
    Ubuntu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Os {
    Linux(OsArch, LinuxType),
}

pub const UBUNTU_X64: Os = Os::Linux(OsArch::X64, LinuxType::Ubuntu);

#[derive(Error, Debug)]
pub enum OsError {
    #[error("unsupported architecture {0}")]
    UnsupportedArch(String),

    #[error("unsupported Linux distribution (only Ubuntu is supported)")]
    UnsupportedDistribution,
}

/// Pure parser of `/etc/os-release`, for test data injection
pub fn parse_os_release(text: &str) -> Option<LinuxType> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("ID="))
        .map(|id| id.trim_matches(|c| c == '"' || c == '\''))
        .find_map(|id| match id {
            "ubuntu" => Some(LinuxType::Ubuntu),
            _ => None,
        })
}

pub fn parse_arch(arch: &str) -> Result<OsArch, OsError> {
    match arch {
        "x86_64" => Ok(OsArch::X64),
        other => Err(OsError::UnsupportedArch(other.to_string())),
    }
}

/// Detect the running OS from `/etc/os-release` and the compile target
/// # Errors
/// Fails on unreadable os-release or on an unsupported OS
pub async fn detect_os() -> anyhow::Result<Os> {
    let path = Path::new("/etc/os-release");
    let release = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let arch = parse_arch(std::env::consts::ARCH)?;
    let linux = parse_os_release(&release).ok_or(OsError::UnsupportedDistribution)?;
    Ok(Os::Linux(arch, linux))
}
