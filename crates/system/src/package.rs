use std::fmt;
use std::path::Path;

use reqwest::Url;

use crate::download::DownloadRequest;
use crate::os::Os;
use crate::plan::Plan;
use crate::plan::pipeline::CommandSpec;

#[derive(Clone, Debug, PartialEq)]
pub struct Software {
    pub organization: String,
    pub name: String,
    pub version: String,
}

impl Software {
    pub fn new(organization: &str, name: &str, version: &str) -> Self {
        Self {
            organization: organization.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

/// What gets installed for an image: the low-level package name (`code` for
/// the `vscode` image), vendor info and where the artifact comes from
#[derive(Clone, Debug, PartialEq)]
pub struct Package {
    pub name: String,
    pub os: Os,
    pub software: Software,
    pub site: Url,
    pub fetch: Option<DownloadRequest>,
}

impl Package {
    pub fn new(
        name: &str,
        os: Os,
        software: Software,
        site: Url,
        fetch: Option<DownloadRequest>,
    ) -> Self {
        Self {
            name: name.to_string(),
            os,
            software,
            site,
            fetch,
        }
    }

    #[must_use]
    pub fn to_os_pkg(&self, pkg_type: PkgType) -> OsPkg {
        OsPkg {
            pkg_type,
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.name, self.software.version)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PkgType {
    Deb,
}

/// Package as the system package manager knows it
#[derive(Clone, Debug, PartialEq)]
pub struct OsPkg {
    pub pkg_type: PkgType,
    pub name: String,
}

impl OsPkg {
    #[must_use]
    pub fn install_plan(&self, file: &Path) -> Plan {
        match self.pkg_type {
            PkgType::Deb => {
                Plan::new().step(CommandSpec::sudo("dpkg").arg("--install").arg_path(file))
            }
        }
    }

    /// Pulls dependencies a package file didn't bring along
    #[must_use]
    pub fn fix_dependencies_plan(&self) -> Plan {
        match self.pkg_type {
            PkgType::Deb => Plan::new()
                .step(CommandSpec::sudo("apt-get").args(["--fix-broken", "--yes", "install"])),
        }
    }

    #[must_use]
    pub fn uninstall_plan(&self) -> Plan {
        match self.pkg_type {
            PkgType::Deb => Plan::new()
                .step(CommandSpec::sudo("apt-get").args(["--yes", "remove"]).arg(&self.name))
                .step(CommandSpec::sudo("apt-get").args(["--yes", "autoremove"])),
        }
    }
}
