use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum VersionError {
    #[error("version `{0}` must have {1} dot-separated components")]
    Components(String, usize),

    #[error("version `{0}` must have {1} to {2} dot-separated components")]
    ComponentRange(String, usize, usize),

    #[error("version component `{0}` is not a number")]
    NotNumeric(String),
}

/// `major.minor.patch`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct SemVer(pub u32, pub u32, pub u32);

/// `major.minor.patch.revision`, as used by Zoom and JetBrains Toolbox builds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct SemVerRev(pub u32, pub u32, pub u32, pub u32);

/// Release number of 2 to 4 numeric parts kept as written, JetBrains ships
/// `2024.2`, `2024.1.4` and `2024.2.0.1` alike
#[derive(Clone, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct DottedVersion(String);

impl DottedVersion {
    const MIN_PARTS: usize = 2;
    const MAX_PARTS: usize = 4;
}

// For visualization purposes, serializers should have explicit formatters
impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let SemVer(major, minor, patch) = self;
        write!(f, "{major}.{minor}.{patch}")
    }
}

impl fmt::Display for SemVerRev {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let SemVerRev(major, minor, patch, rev) = self;
        write!(f, "{major}.{minor}.{patch}.{rev}")
    }
}

fn parse_components<const N: usize>(s: &str) -> Result<[u32; N], VersionError> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != N {
        return Err(VersionError::Components(s.to_string(), N));
    }
    let mut out = [0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| VersionError::NotNumeric(part.to_string()))?;
    }
    Ok(out)
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DottedVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if !(Self::MIN_PARTS..=Self::MAX_PARTS).contains(&parts.len()) {
            return Err(VersionError::ComponentRange(
                s.to_string(),
                Self::MIN_PARTS,
                Self::MAX_PARTS,
            ));
        }
        for part in parts {
            part.parse::<u32>()
                .map_err(|_| VersionError::NotNumeric(part.to_string()))?;
        }
        Ok(DottedVersion(s.to_string()))
    }
}

impl FromStr for SemVer {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [major, minor, patch] = parse_components(s)?;
        Ok(SemVer(major, minor, patch))
    }
}

impl FromStr for SemVerRev {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [major, minor, patch, rev] = parse_components(s)?;
        Ok(SemVerRev(major, minor, patch, rev))
    }
}
