use thiserror::Error;
use tracing::debug;

use super::desktop::{ToolboxImage, VsCodeConfig, VsCodeImage, ZoomImage};
use super::info::ImageInfoLoader;
use super::jetbrains::JetBrainsImage;
use super::server::{
    GoImage, GradleImage, JavaImage, MinicondaConfig, MinicondaImage, NodeImage, NvmImage,
    RustConfig, RustImage, SdkmanImage,
};
use super::{DesktopImageId, ImageConfig, ImageId, ImageOps, ServerImageId, UnknownImageId};
use crate::os::Os;

#[derive(Error, Debug, PartialEq)]
pub enum RepositoryError {
    #[error(transparent)]
    Unknown(#[from] UnknownImageId),

    #[error("Image {0} has no configuration")]
    NoConfig(ImageId),
}

/// Builds image operations from their info files for the host OS
#[derive(Clone, Debug)]
pub struct Repository {
    loader: ImageInfoLoader,
    os: Os,
}

impl Repository {
    #[must_use]
    pub fn new(loader: ImageInfoLoader, os: Os) -> Self {
        Self { loader, os }
    }

    /// # Errors
    /// Fails if the id is unknown
    pub fn parse_id(&self, raw: &str) -> Result<ImageId, RepositoryError> {
        Ok(raw.parse::<ImageId>()?)
    }

    /// # Errors
    /// Fails if the info file of the image can't be read
    pub async fn load(&self, id: &ImageId) -> anyhow::Result<Box<dyn ImageOps>> {
        debug!("Loading image {id}");
        let loader = &self.loader;
        let os = self.os;

        let ops: Box<dyn ImageOps> = match *id {
            ImageId::Server(server) => match server {
                ServerImageId::Rust => Box::new(RustImage::new(os)?),
                ServerImageId::Go => Box::new(GoImage::new(os, loader.load(id).await?)?),
                ServerImageId::Sdkman => Box::new(SdkmanImage::new(os)?),
                ServerImageId::Java => Box::new(JavaImage::new(os, loader.load(id).await?)?),
                ServerImageId::Gradle => {
                    Box::new(GradleImage::new(os, loader.load(id).await?)?)
                }
                ServerImageId::Nvm => Box::new(NvmImage::new(os, loader.load(id).await?)?),
                ServerImageId::Node => Box::new(NodeImage::new(os, loader.load(id).await?)?),
                ServerImageId::Miniconda => {
                    Box::new(MinicondaImage::new(os, loader.load(id).await?)?)
                }
            },
            ImageId::Desktop(desktop) => match desktop {
                DesktopImageId::Zoom => Box::new(ZoomImage::new(os, loader.load(id).await?)?),
                DesktopImageId::VsCode => {
                    Box::new(VsCodeImage::new(os, loader.load(id).await?)?)
                }
                DesktopImageId::JetBrainsToolbox => {
                    Box::new(ToolboxImage::new(os, loader.load(id).await?)?)
                }
            },
            ImageId::JetBrains(ide) => {
                Box::new(JetBrainsImage::new(os, ide, loader.load(id).await?)?)
            }
        };
        Ok(ops)
    }

    /// # Errors
    /// Fails if the image has no configuration or its config file can't be read
    pub async fn load_config(&self, id: &ImageId) -> anyhow::Result<Box<dyn ImageConfig>> {
        debug!("Loading config of image {id}");
        let loader = &self.loader;

        let config: Box<dyn ImageConfig> = match *id {
            ImageId::Server(ServerImageId::Rust) => {
                Box::new(loader.load_config::<RustConfig>(id).await?)
            }
            ImageId::Server(ServerImageId::Miniconda) => {
                Box::new(loader.load_config::<MinicondaConfig>(id).await?)
            }
            ImageId::Desktop(DesktopImageId::VsCode) => {
                Box::new(loader.load_config::<VsCodeConfig>(id).await?)
            }
            _ => return Err(RepositoryError::NoConfig(*id).into()),
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::JetBrainsImageId;
    use crate::image::test::{test_loader, test_repository};
    use crate::os::UBUNTU_X64;

    #[tokio::test]
    async fn loads_every_image() -> anyhow::Result<()> {
        let repo = test_repository();

        for id in ImageId::all() {
            let ops = repo.load(&id).await?;
            assert_eq!(ops.image().id, id);
        }
        Ok(())
    }

    #[tokio::test]
    async fn basic_images_need_no_info() -> anyhow::Result<()> {
        let repo = Repository::new(ImageInfoLoader::new("/nonexistent"), UBUNTU_X64);

        assert!(repo.load(&ServerImageId::Rust.into()).await.is_ok());
        assert!(repo.load(&ServerImageId::Sdkman.into()).await.is_ok());
        assert!(repo.load(&ServerImageId::Go.into()).await.is_err());
        Ok(())
    }

    #[test]
    fn parses_ids() {
        let repo = Repository::new(test_loader(), UBUNTU_X64);

        assert_eq!(
            repo.parse_id("intellij-idea"),
            Ok(ImageId::JetBrains(JetBrainsImageId::IntellijIdea))
        );
        assert_eq!(
            repo.parse_id("vs-code").unwrap_err().to_string(),
            "String ID vs-code not found in the image repository"
        );
    }

    #[tokio::test]
    async fn loads_configurable_images() -> anyhow::Result<()> {
        let repo = test_repository();

        for id in [
            ImageId::Server(ServerImageId::Rust),
            ImageId::Server(ServerImageId::Miniconda),
            ImageId::Desktop(DesktopImageId::VsCode),
        ] {
            assert_eq!(repo.load_config(&id).await?.image_id(), id);
        }
        Ok(())
    }

    #[tokio::test]
    async fn rejects_config_of_plain_images() {
        let repo = test_repository();
        let err = repo
            .load_config(&ImageId::Server(ServerImageId::Go))
            .await
            .err()
            .map(|e| e.to_string());

        assert_eq!(err.as_deref(), Some("Image go has no configuration"));
    }
}
