//! JetBrains IDEs installed from their standalone Linux tarballs, one
//! directory per IDE under `~/.local/share/JetBrains` and a launcher symlink
//! in `~/.local/bin`.

use reqwest::Url;
use serde::Deserialize;
use serde_with::serde_as;

use super::desktop::extract_tarball;
use super::server::remove_dir;
use super::{Image, ImageContext, ImageOps, JetBrainsImageId, required_fetch};
use crate::download::{DownloadRequest, Integrity};
use crate::os::Os;
use crate::package::{Package, Software};
use crate::plan::Plan;
use crate::plan::pipeline::CommandSpec;
use crate::version::DottedVersion;

#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct JetBrainsInfo {
    pub version: DottedVersion,
    #[serde_as(as = "serde_with::hex::Hex")]
    pub hash_sha256: [u8; 32],
}

/// Download layout of a product on `download.jetbrains.com`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Product {
    pub name: &'static str,
    pub path: &'static str,
    pub file_prefix: &'static str,
    pub launcher: &'static str,
}

impl JetBrainsImageId {
    #[must_use]
    pub fn product(&self) -> Product {
        let (name, path, file_prefix, launcher) = match self {
            JetBrainsImageId::IntellijIdea => ("IntelliJ IDEA Ultimate", "idea", "ideaIU", "idea.sh"),
            JetBrainsImageId::WebStorm => ("WebStorm", "webstorm", "WebStorm", "webstorm.sh"),
            JetBrainsImageId::RustRover => ("RustRover", "rustrover", "RustRover", "rustrover.sh"),
            JetBrainsImageId::CLion => ("CLion", "cpp", "CLion", "clion.sh"),
            JetBrainsImageId::PyCharm => {
                ("PyCharm Professional", "python", "pycharm-professional", "pycharm.sh")
            }
            JetBrainsImageId::GoLand => ("GoLand", "go", "goland", "goland.sh"),
            JetBrainsImageId::DataGrip => ("DataGrip", "datagrip", "datagrip", "datagrip.sh"),
        };
        Product {
            name,
            path,
            file_prefix,
            launcher,
        }
    }
}

pub struct JetBrainsImage {
    image: Image,
    product: Product,
}

impl JetBrainsImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(
        os: Os,
        id: JetBrainsImageId,
        JetBrainsInfo {
            version,
            hash_sha256,
        }: JetBrainsInfo,
    ) -> anyhow::Result<Self> {
        let product = id.product();
        let fetch_url = match os {
            Os::Linux(_, _) => format!(
                "https://download.jetbrains.com/{}/{}-{version}.tar.gz",
                product.path, product.file_prefix
            ),
        };

        Ok(JetBrainsImage {
            image: Image::new(
                id,
                Package::new(
                    &id.to_string(),
                    os,
                    Software::new("JetBrains s.r.o.", product.name, &version.to_string()),
                    Url::parse("https://www.jetbrains.com/products")?,
                    Some(DownloadRequest::new(
                        &fetch_url,
                        Integrity::Sha256(hash_sha256),
                    )?),
                ),
            ),
            product,
        })
    }
}

impl ImageOps for JetBrainsImage {
    fn image(&self) -> &Image {
        &self.image
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let id = self.image.id;
        let (fetch, tarball) = ctx.fetch(required_fetch(&self.image)?);
        let dest = ctx.home_path(format!(".local/share/JetBrains/{id}"));
        let bin = ctx.home_path(".local/bin");

        Ok(Plan::new()
            .step(fetch)
            .step(remove_dir(&dest))
            .then(extract_tarball(&tarball, &dest))
            .step(CommandSpec::new("mkdir").arg("-p").arg_path(&bin))
            .step(
                CommandSpec::new("ln")
                    .arg("-sf")
                    .arg_path(dest.join("bin").join(self.product.launcher))
                    .arg_path(bin.join(id.to_string())),
            ))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let id = self.image.id;

        Ok(Plan::new()
            .step(CommandSpec::new("rm").arg("-f").arg_path(ctx.home_path(format!(".local/bin/{id}"))))
            .step(remove_dir(&ctx.home_path(format!(".local/share/JetBrains/{id}")))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::test::{test_context, test_loader};
    use crate::os::UBUNTU_X64;

    async fn load(id: JetBrainsImageId) -> anyhow::Result<JetBrainsImage> {
        let info: JetBrainsInfo = test_loader().load(&id.into()).await?;
        JetBrainsImage::new(UBUNTU_X64, id, info)
    }

    #[tokio::test]
    async fn builds_product_urls() -> anyhow::Result<()> {
        let cases = [
            (JetBrainsImageId::IntellijIdea, "https://download.jetbrains.com/idea/ideaIU-2024.2.tar.gz"),
            (JetBrainsImageId::CLion, "https://download.jetbrains.com/cpp/CLion-2024.2.tar.gz"),
            (
                JetBrainsImageId::PyCharm,
                "https://download.jetbrains.com/python/pycharm-professional-2024.2.0.1.tar.gz",
            ),
        ];

        for (id, url) in cases {
            assert_eq!(required_fetch(load(id).await?.image())?.url().as_str(), url);
        }
        Ok(())
    }

    #[tokio::test]
    async fn plans_ide_with_launcher() -> anyhow::Result<()> {
        let image = load(JetBrainsImageId::RustRover).await?;
        let ctx = test_context();
        let script = image.install(&ctx)?.into_script();

        assert!(script[0].starts_with(
            "fetch https://download.jetbrains.com/rustrover/RustRover-2024.2.tar.gz -> /tmp/system/RustRover-2024.2.tar.gz (sha256 "
        ));
        assert_eq!(
            script[1..],
            [
                "rm -rf /home/user/.local/share/JetBrains/rustrover",
                "mkdir -p /home/user/.local/share/JetBrains/rustrover",
                "tar -xzf /tmp/system/RustRover-2024.2.tar.gz -C /home/user/.local/share/JetBrains/rustrover --strip-components=1",
                "mkdir -p /home/user/.local/bin",
                "ln -sf /home/user/.local/share/JetBrains/rustrover/bin/rustrover.sh /home/user/.local/bin/rustrover",
            ]
        );
        assert_eq!(
            image.uninstall(&ctx)?.into_script(),
            &[
                "rm -f /home/user/.local/bin/rustrover",
                "rm -rf /home/user/.local/share/JetBrains/rustrover",
            ]
        );
        Ok(())
    }

    #[test]
    fn reads_versions_of_any_length() -> anyhow::Result<()> {
        let info: JetBrainsInfo = serde_json::from_str(&format!(
            r#"{{"version": "2024.1.4", "hash_sha256": "{}"}}"#,
            "00".repeat(32)
        ))?;
        let image = JetBrainsImage::new(UBUNTU_X64, JetBrainsImageId::GoLand, info)?;

        assert_eq!(image.image().package.software.version, "2024.1.4");
        assert_eq!(
            required_fetch(image.image())?.url().as_str(),
            "https://download.jetbrains.com/go/goland-2024.1.4.tar.gz"
        );
        Ok(())
    }
}
