use reqwest::Url;
use serde::Deserialize;
use serde_with::serde_as;

use super::remove_dir;
use crate::download::{DownloadRequest, Integrity};
use crate::image::{
    Image, ImageConfig, ImageContext, ImageId, ImageOps, ServerImageId, required_fetch,
};
use crate::os::{Os, OsArch};
use crate::package::{Package, Software};
use crate::plan::Plan;
use crate::plan::pipeline::CommandSpec;

const PREFIX: &str = "miniconda3";

/// Installer build, e.g. `py312_24.5.0-0`, and its published checksum
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MinicondaInfo {
    pub version: String,
    #[serde_as(as = "serde_with::hex::Hex")]
    pub hash_sha256: [u8; 32],
}

pub struct MinicondaImage(Image);

impl MinicondaImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(
        os: Os,
        MinicondaInfo {
            version,
            hash_sha256,
        }: MinicondaInfo,
    ) -> anyhow::Result<Self> {
        let id = ServerImageId::Miniconda;
        let platform = match os {
            Os::Linux(OsArch::X64, _) => "Linux-x86_64",
        };
        let fetch_url =
            format!("https://repo.anaconda.com/miniconda/Miniconda3-{version}-{platform}.sh");

        Ok(MinicondaImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new("Anaconda, Inc.", "Miniconda", &version),
                Url::parse("https://docs.anaconda.com/miniconda")?,
                Some(DownloadRequest::new(
                    &fetch_url,
                    Integrity::Sha256(hash_sha256),
                )?),
            ),
        )))
    }
}

fn conda(ctx: &ImageContext) -> CommandSpec {
    CommandSpec::new(ctx.home_path(PREFIX).join("bin/conda").to_string_lossy())
}

impl ImageOps for MinicondaImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let (fetch, installer) = ctx.fetch(required_fetch(&self.0)?);

        Ok(Plan::new()
            .step(fetch)
            .step(
                CommandSpec::new("bash")
                    .arg_path(&installer)
                    .args(["-b", "-u", "-p"])
                    .arg_path(ctx.home_path(PREFIX)),
            )
            .step(conda(ctx).args(["init", "bash"])))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(Plan::new()
            .step(conda(ctx).args(["init", "--reverse", "bash"]))
            .step(remove_dir(&ctx.home_path(PREFIX))))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MinicondaConfig {
    #[serde(default = "default_auto_activate")]
    pub auto_activate_base: bool,
}

fn default_auto_activate() -> bool {
    true
}

impl ImageConfig for MinicondaConfig {
    fn image_id(&self) -> ImageId {
        ServerImageId::Miniconda.into()
    }

    fn config(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(Plan::new().step(conda(ctx).args(["config", "--set", "auto_activate_base"]).arg(
            if self.auto_activate_base {
                "true"
            } else {
                "false"
            },
        )))
    }
}
