use reqwest::Url;
use serde::Deserialize;
use serde_with::serde_as;

use crate::download::{DownloadRequest, Integrity};
use crate::image::{Image, ImageContext, ImageOps, ServerImageId, required_fetch};
use crate::os::{Os, OsArch};
use crate::package::{Package, Software};
use crate::plan::pipeline::CommandSpec;
use crate::plan::{Plan, Step};
use crate::version::SemVer;

const INSTALL_DIR: &str = "/usr/local/go";
const PATH_EXPORT: &str = "export PATH=$PATH:/usr/local/go/bin";

#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GoInfo {
    pub version: SemVer,
    #[serde_as(as = "serde_with::hex::Hex")]
    pub hash_sha256: [u8; 32],
}

pub struct GoImage(Image);

impl GoImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(os: Os, GoInfo { version, hash_sha256 }: GoInfo) -> anyhow::Result<Self> {
        let id = ServerImageId::Go;
        let platform = match os {
            Os::Linux(OsArch::X64, _) => "linux-amd64",
        };
        let fetch_url = format!("https://go.dev/dl/go{version}.{platform}.tar.gz");

        Ok(GoImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new("Google LLC", "Go", &version.to_string()),
                Url::parse("https://go.dev/doc/install")?,
                Some(DownloadRequest::new(
                    &fetch_url,
                    Integrity::Sha256(hash_sha256),
                )?),
            ),
        )))
    }
}

impl ImageOps for GoImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let (fetch, tarball) = ctx.fetch(required_fetch(&self.0)?);

        // Go docs require removing any previous tree before extracting
        Ok(Plan::new()
            .step(fetch)
            .step(CommandSpec::sudo("rm").arg("-rf").arg(INSTALL_DIR))
            .step(
                CommandSpec::sudo("tar")
                    .args(["-C", "/usr/local", "-xzf"])
                    .arg_path(&tarball),
            )
            .step(Step::AppendLine {
                file: ctx.home_path(".profile"),
                line: PATH_EXPORT.to_string(),
            }))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(Plan::new()
            .step(CommandSpec::sudo("rm").arg("-rf").arg(INSTALL_DIR))
            .step(Step::RemoveLines {
                file: ctx.home_path(".profile"),
                marker: "/usr/local/go/bin".to_string(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::test::{GO_SHA256, test_context, test_loader};
    use crate::os::UBUNTU_X64;

    #[tokio::test]
    async fn loads_go_info() -> anyhow::Result<()> {
        let info: GoInfo = test_loader().load(&ServerImageId::Go.into()).await?;

        assert_eq!(info.version, SemVer(1, 22, 5));
        assert_eq!(hex::encode(info.hash_sha256), GO_SHA256);
        Ok(())
    }

    #[tokio::test]
    async fn plans_go_install() -> anyhow::Result<()> {
        let info: GoInfo = test_loader().load(&ServerImageId::Go.into()).await?;
        let image = GoImage::new(UBUNTU_X64, info)?;
        let ctx = test_context();

        assert_eq!(
            image.install(&ctx)?.into_script(),
            &[
                format!(
                    "fetch https://go.dev/dl/go1.22.5.linux-amd64.tar.gz -> /tmp/system/go1.22.5.linux-amd64.tar.gz (sha256 {GO_SHA256})"
                )
                .as_str(),
                "sudo rm -rf /usr/local/go",
                "sudo tar -C /usr/local -xzf /tmp/system/go1.22.5.linux-amd64.tar.gz",
                "append 'export PATH=$PATH:/usr/local/go/bin' to /home/user/.profile",
            ]
        );
        assert_eq!(
            image.uninstall(&ctx)?.into_script(),
            &[
                "sudo rm -rf /usr/local/go",
                "remove lines containing '/usr/local/go/bin' from /home/user/.profile",
            ]
        );
        Ok(())
    }

    #[test]
    fn rejects_bad_hash() {
        let res = serde_json::from_str::<GoInfo>(r#"{"version": "1.22.5", "hash_sha256": "fixme"}"#);

        assert!(res.is_err());
    }
}
