use reqwest::Url;
use serde::Deserialize;
use serde_with::serde_as;

use super::extract_tarball;
use crate::download::{DownloadRequest, Integrity};
use crate::image::server::remove_dir;
use crate::image::{DesktopImageId, Image, ImageContext, ImageOps, required_fetch};
use crate::os::Os;
use crate::package::{Package, Software};
use crate::plan::Plan;
use crate::version::SemVerRev;

const TOOLBOX_DIR: &str = ".local/share/JetBrains/Toolbox";

#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ToolboxInfo {
    pub version: SemVerRev,
    #[serde_as(as = "serde_with::hex::Hex")]
    pub hash_sha256: [u8; 32],
}

pub struct ToolboxImage(Image);

impl ToolboxImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(
        os: Os,
        ToolboxInfo {
            version,
            hash_sha256,
        }: ToolboxInfo,
    ) -> anyhow::Result<Self> {
        let id = DesktopImageId::JetBrainsToolbox;
        let fetch_url = match os {
            Os::Linux(_, _) => format!(
                "https://download.jetbrains.com/toolbox/jetbrains-toolbox-{version}.tar.gz"
            ),
        };

        Ok(ToolboxImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new("JetBrains s.r.o.", "JetBrains Toolbox", &version.to_string()),
                Url::parse("https://www.jetbrains.com/toolbox-app")?,
                Some(DownloadRequest::new(
                    &fetch_url,
                    Integrity::Sha256(hash_sha256),
                )?),
            ),
        )))
    }
}

impl ImageOps for ToolboxImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let (fetch, tarball) = ctx.fetch(required_fetch(&self.0)?);
        let bin = ctx.home_path(TOOLBOX_DIR).join("bin");

        Ok(Plan::new()
            .step(fetch)
            .step(remove_dir(&bin))
            .then(extract_tarball(&tarball, &bin)))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(Plan::new().step(remove_dir(&ctx.home_path(TOOLBOX_DIR))))
    }
}
