use reqwest::Url;
use serde::Deserialize;

use crate::download::gpg::GpgKey;
use crate::download::{DownloadRequest, Integrity};
use crate::image::{DesktopImageId, Image, ImageContext, ImageOps, required_fetch};
use crate::os::{LinuxType, Os, OsArch};
use crate::package::{Package, PkgType, Software};
use crate::plan::Plan;
use crate::version::SemVerRev;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ZoomInfo {
    pub version: SemVerRev,
    pub public_key_version: String,
    pub key_fingerprint: String,
}

/// Zoom ships a `.deb` signed with its own public key, which is imported and
/// checked against the expected fingerprint before installing
pub struct ZoomImage(Image);

impl ZoomImage {
    /// # Errors
    /// Fails if the info file yields an invalid URL
    pub fn new(
        os: Os,
        ZoomInfo {
            version,
            public_key_version,
            key_fingerprint,
        }: ZoomInfo,
    ) -> anyhow::Result<Self> {
        let id = DesktopImageId::Zoom;
        let filename = match os {
            Os::Linux(OsArch::X64, LinuxType::Ubuntu) => "zoom_amd64.deb",
        };
        let fetch_url = format!("https://zoom.us/client/{version}/{filename}");
        let key_url = Url::parse(&format!(
            "https://zoom.us/linux/download/pubkey?version={public_key_version}"
        ))?;

        Ok(ZoomImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new(
                    "Zoom Video Communications, Inc",
                    "Zoom",
                    &version.to_string(),
                ),
                Url::parse("https://zoom.us/download")?,
                Some(DownloadRequest::new(
                    &fetch_url,
                    Integrity::Gpg(GpgKey::new(key_url, key_fingerprint)),
                )?),
            ),
        )))
    }
}

impl ImageOps for ZoomImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let (fetch, deb) = ctx.fetch(required_fetch(&self.0)?);
        let pkg = self.0.package.to_os_pkg(PkgType::Deb);

        // The Zoom .deb depends on libraries missing from a stock desktop
        Ok(Plan::new()
            .step(fetch)
            .then(pkg.install_plan(&deb))
            .then(pkg.fix_dependencies_plan()))
    }

    fn uninstall(&self, _ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(self.0.package.to_os_pkg(PkgType::Deb).uninstall_plan())
    }
}
