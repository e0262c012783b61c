use std::path::PathBuf;

use reqwest::Url;
use serde::Deserialize;

use super::{curl_into, remove_dir, with_init_script};
use crate::image::{Image, ImageContext, ImageOps, ServerImageId};
use crate::os::Os;
use crate::package::{Package, Software};
use crate::plan::pipeline::CommandSpec;
use crate::plan::{Plan, Step};
use crate::version::SemVer;

fn nvm_script(ctx: &ImageContext) -> PathBuf {
    ctx.home_path(".nvm/nvm.sh")
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NvmInfo {
    pub version: SemVer,
}

pub struct NvmImage(Image);

impl NvmImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(os: Os, NvmInfo { version }: NvmInfo) -> anyhow::Result<Self> {
        let id = ServerImageId::Nvm;

        Ok(NvmImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new("nvm-sh", "nvm", &version.to_string()),
                Url::parse("https://github.com/nvm-sh/nvm")?,
                None,
            ),
        )))
    }

    fn installer_url(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/nvm-sh/nvm/v{}/install.sh",
            self.0.package.software.version
        )
    }
}

impl ImageOps for NvmImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, _ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(Plan::new().step(curl_into(
            &self.installer_url(),
            &["-o-"],
            CommandSpec::new("bash"),
        )))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(Plan::new()
            .step(remove_dir(&ctx.home_path(".nvm")))
            .step(Step::RemoveLines {
                file: ctx.home_path(".bashrc"),
                marker: "NVM_DIR".to_string(),
            }))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NodeInfo {
    pub version: SemVer,
}

/// Node.js managed by nvm, so nvm must be installed first
pub struct NodeImage(Image);

impl NodeImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(os: Os, NodeInfo { version }: NodeInfo) -> anyhow::Result<Self> {
        let id = ServerImageId::Node;

        Ok(NodeImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new("OpenJS Foundation", "Node.js", &version.to_string()),
                Url::parse("https://nodejs.org/en/download/package-manager")?,
                None,
            ),
        )))
    }
}

impl ImageOps for NodeImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let version = &self.0.package.software.version;
        Ok(Plan::new().step(with_init_script(
            &nvm_script(ctx),
            &format!("nvm install {version}"),
        )))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let version = &self.0.package.software.version;
        Ok(Plan::new().step(with_init_script(
            &nvm_script(ctx),
            &format!("nvm uninstall {version}"),
        )))
    }
}
