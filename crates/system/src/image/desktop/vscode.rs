use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_with::serde_as;
use thiserror::Error;
use tracing::{info, warn};

use crate::download::{DownloadRequest, Downloader, Integrity};
use crate::image::{
    DesktopImageId, Image, ImageConfig, ImageContext, ImageId, ImageOps, required_fetch,
};
use crate::os::{Os, OsArch};
use crate::package::{Package, PkgType, Software};
use crate::plan::pipeline::CommandSpec;
use crate::plan::{Plan, Step};
use crate::version::SemVer;

#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct VsCodeInfo {
    pub version: SemVer,
    #[serde_as(as = "serde_with::hex::Hex")]
    pub hash_sha256: [u8; 32],
    #[serde(default)]
    pub use_latest_if_version_is_old: bool,
}

#[derive(Error, Debug, PartialEq)]
#[error(
    "Unable to fetch required version {version}, redirected to {final_url}. \
     Hint: make sure to update vscode.json to the latest version or set \
     use_latest_if_version_is_old to true"
)]
pub struct OutdatedVersion {
    pub version: String,
    pub final_url: String,
}

pub struct VsCodeImage {
    image: Image,
    use_latest_if_version_is_old: bool,
    resolved: Option<DownloadRequest>,
}

impl VsCodeImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(
        os: Os,
        VsCodeInfo {
            version,
            hash_sha256,
            use_latest_if_version_is_old,
        }: VsCodeInfo,
    ) -> anyhow::Result<Self> {
        let id = DesktopImageId::VsCode;
        let fetch_url = match os {
            Os::Linux(OsArch::X64, _) => {
                "https://code.visualstudio.com/sha/download?build=stable&os=linux-deb-x64"
            }
        };

        Ok(VsCodeImage {
            image: Image::new(
                id,
                Package::new(
                    "code",
                    os,
                    Software::new(
                        "Microsoft Corporation",
                        "Visual Studio Code",
                        &version.to_string(),
                    ),
                    Url::parse("https://code.visualstudio.com/download")?,
                    Some(DownloadRequest::new(
                        fetch_url,
                        Integrity::Sha256(hash_sha256),
                    )?),
                ),
            ),
            use_latest_if_version_is_old,
            resolved: None,
        })
    }

    /// The stable URL redirects to a versioned `.../code_<version>-...deb`
    /// file. The hash only applies when that file is the expected version.
    /// # Errors
    /// Fails when the redirect points to another version and falling back
    /// to latest is not allowed
    pub fn choose_request(&self, final_url: &Url) -> anyhow::Result<DownloadRequest> {
        let generic = required_fetch(&self.image)?;
        let version = &self.image.package.software.version;

        if final_url.as_str().contains(&format!("/code_{version}")) {
            Ok(DownloadRequest::new(
                final_url.as_str(),
                generic.integrity().clone(),
            )?)
        } else if self.use_latest_if_version_is_old {
            warn!(
                "Unable to fetch version {version}, fetching the latest without hash integrity check since use_latest_if_version_is_old is true"
            );
            Ok(DownloadRequest::new(final_url.as_str(), Integrity::None)?)
        } else {
            Err(OutdatedVersion {
                version: version.clone(),
                final_url: final_url.to_string(),
            }
            .into())
        }
    }

    fn request(&self) -> anyhow::Result<&DownloadRequest> {
        match &self.resolved {
            Some(req) => Ok(req),
            None => required_fetch(&self.image),
        }
    }
}

#[async_trait]
impl ImageOps for VsCodeImage {
    fn image(&self) -> &Image {
        &self.image
    }

    async fn resolve(&mut self, downloader: &Downloader) -> anyhow::Result<()> {
        let generic = required_fetch(&self.image)?.url().clone();
        let final_url = downloader.resolve_redirect(&generic).await?;
        info!("VS Code stable download resolved to {final_url}");

        self.resolved = Some(self.choose_request(&final_url)?);
        Ok(())
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let (fetch, deb) = ctx.fetch(self.request()?);
        let pkg = self.image.package.to_os_pkg(PkgType::Deb);

        Ok(Plan::new().step(fetch).then(pkg.install_plan(&deb)))
    }

    fn uninstall(&self, _ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(self.image.package.to_os_pkg(PkgType::Deb).uninstall_plan())
    }
}

/// Extensions and user settings restored by `system config vscode`
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct VsCodeConfig {
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

impl ImageConfig for VsCodeConfig {
    fn image_id(&self) -> ImageId {
        DesktopImageId::VsCode.into()
    }

    fn config(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let mut plan = Plan::new().steps(
            self.extensions
                .iter()
                .map(|ext| CommandSpec::new("code").arg("--install-extension").arg(ext)),
        );

        if let Some(settings) = &self.settings {
            plan = plan.step(Step::WriteFile {
                path: ctx.home_path(".config/Code/User/settings.json"),
                contents: serde_json::to_string_pretty(settings)?,
            });
        }
        Ok(plan)
    }
}
