use reqwest::Url;
use serde::Deserialize;

use super::curl_into;
use crate::download::{DownloadRequest, Integrity};
use crate::image::{
    Image, ImageConfig, ImageContext, ImageId, ImageOps, ServerImageId, required_fetch,
};
use crate::os::Os;
use crate::package::{Package, Software};
use crate::plan::Plan;
use crate::plan::pipeline::CommandSpec;

pub struct RustImage(Image);

impl RustImage {
    /// Rustup always installs the latest stable toolchain, no info file needed
    /// # Errors
    /// Fails only on malformed built-in URLs
    pub fn new(os: Os) -> anyhow::Result<Self> {
        let id = ServerImageId::Rust;
        let fetch_url = match os {
            Os::Linux(_, _) => "https://sh.rustup.rs",
        };

        Ok(RustImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new("Rust Team", "Rust", "latest"),
                Url::parse("https://www.rust-lang.org/tools/install")?,
                Some(DownloadRequest::new(fetch_url, Integrity::None)?),
            ),
        )))
    }
}

impl ImageOps for RustImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, _ctx: &ImageContext) -> anyhow::Result<Plan> {
        let url = required_fetch(&self.0)?.url().as_str();
        let rustup = curl_into(
            url,
            &["--proto", "=https", "--tlsv1.2", "-sSf"],
            CommandSpec::new("sh").args(["-s", "--", "-y"]),
        );
        Ok(Plan::new().step(rustup))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(Plan::new().step(
            CommandSpec::new(ctx.home_path(".cargo/bin/rustup").to_string_lossy())
                .args(["self", "uninstall", "-y"]),
        ))
    }
}

/// Toolchain setup restored by `system config rust`
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RustConfig {
    #[serde(default)]
    pub default_toolchain: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
}

impl ImageConfig for RustConfig {
    fn image_id(&self) -> ImageId {
        ServerImageId::Rust.into()
    }

    fn config(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let rustup = ctx.home_path(".cargo/bin/rustup").to_string_lossy().into_owned();
        let mut plan = Plan::new();

        if let Some(toolchain) = &self.default_toolchain {
            plan = plan.step(CommandSpec::new(&rustup).arg("default").arg(toolchain));
        }
        if !self.components.is_empty() {
            plan = plan.step(
                CommandSpec::new(&rustup)
                    .args(["component", "add"])
                    .args(self.components.iter().cloned()),
            );
        }
        Ok(plan)
    }
}
