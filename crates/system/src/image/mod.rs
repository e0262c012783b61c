pub mod desktop;
pub mod info;
pub mod jetbrains;
pub mod repository;
pub mod server;

#[cfg(test)]
pub mod test;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

use crate::download::{DownloadRequest, Downloader};
use crate::os::Os;
use crate::package::Package;
use crate::plan::{Plan, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ServerImageId {
    Rust,
    Go,
    Sdkman,
    Java,
    Gradle,
    Nvm,
    Node,
    Miniconda,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum DesktopImageId {
    Zoom,
    VsCode,
    #[strum(to_string = "jetbrains-toolbox")]
    JetBrainsToolbox,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum JetBrainsImageId {
    #[strum(to_string = "intellij-idea")]
    IntellijIdea,
    WebStorm,
    RustRover,
    CLion,
    PyCharm,
    GoLand,
    DataGrip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Server,
    Desktop,
    JetBrains,
}

impl Category {
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Category::Server => "Server",
            Category::Desktop => "Desktop",
            Category::JetBrains => "JetBrains IDEs",
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("String ID {0} not found in the image repository")]
pub struct UnknownImageId(pub String);

/// Identifier of any image in the repository, `rust`, `vscode`, `intellij-idea`...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageId {
    Server(ServerImageId),
    Desktop(DesktopImageId),
    JetBrains(JetBrainsImageId),
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImageId::Server(id) => write!(f, "{id}"),
            ImageId::Desktop(id) => write!(f, "{id}"),
            ImageId::JetBrains(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for ImageId {
    type Err = UnknownImageId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServerImageId::from_str(s)
            .map(ImageId::Server)
            .or_else(|_| DesktopImageId::from_str(s).map(ImageId::Desktop))
            .or_else(|_| JetBrainsImageId::from_str(s).map(ImageId::JetBrains))
            .map_err(|_| UnknownImageId(s.to_string()))
    }
}

impl ImageId {
    /// Every image, grouped by category in catalog order
    pub fn all() -> impl Iterator<Item = ImageId> {
        ServerImageId::iter()
            .map(ImageId::Server)
            .chain(DesktopImageId::iter().map(ImageId::Desktop))
            .chain(JetBrainsImageId::iter().map(ImageId::JetBrains))
    }

    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            ImageId::Server(_) => Category::Server,
            ImageId::Desktop(_) => Category::Desktop,
            ImageId::JetBrains(_) => Category::JetBrains,
        }
    }

    /// Human readable name shown in the catalog
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            ImageId::Server(id) => match id {
                ServerImageId::Rust => "Rust",
                ServerImageId::Go => "Go",
                ServerImageId::Sdkman => "Sdkman",
                ServerImageId::Java => "Java",
                ServerImageId::Gradle => "Gradle",
                ServerImageId::Nvm => "Nvm",
                ServerImageId::Node => "Node",
                ServerImageId::Miniconda => "Miniconda",
            },
            ImageId::Desktop(id) => match id {
                DesktopImageId::Zoom => "Zoom",
                DesktopImageId::VsCode => "VS Code",
                DesktopImageId::JetBrainsToolbox => "JetBrains Toolbox",
            },
            ImageId::JetBrains(id) => match id {
                JetBrainsImageId::IntellijIdea => "IntelliJ IDEA",
                JetBrainsImageId::WebStorm => "WebStorm",
                JetBrainsImageId::RustRover => "RustRover",
                JetBrainsImageId::CLion => "CLion",
                JetBrainsImageId::PyCharm => "PyCharm",
                JetBrainsImageId::GoLand => "GoLand",
                JetBrainsImageId::DataGrip => "DataGrip",
            },
        }
    }
}

impl From<ServerImageId> for ImageId {
    fn from(id: ServerImageId) -> Self {
        ImageId::Server(id)
    }
}

impl From<DesktopImageId> for ImageId {
    fn from(id: DesktopImageId) -> Self {
        ImageId::Desktop(id)
    }
}

impl From<JetBrainsImageId> for ImageId {
    fn from(id: JetBrainsImageId) -> Self {
        ImageId::JetBrains(id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub id: ImageId,
    pub package: Package,
}

impl Image {
    pub fn new<I: Into<ImageId>>(id: I, package: Package) -> Self {
        Self {
            id: id.into(),
            package,
        }
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Image: {}, Package: {}", self.id, self.package)
    }
}

/// Where an operation runs: user home for user-level installs, and a
/// scratch directory for downloads
#[derive(Clone, Debug)]
pub struct ImageContext {
    pub os: Os,
    pub home: PathBuf,
    pub work_dir: PathBuf,
}

impl ImageContext {
    #[must_use]
    pub fn home_path<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        self.home.join(rel)
    }

    /// Download `request` into the work dir, returns the step and the file
    #[must_use]
    pub fn fetch(&self, request: &DownloadRequest) -> (Step, PathBuf) {
        let path = self.work_dir.join(request.filename());
        let step = Step::Fetch {
            request: request.clone(),
            path: path.clone(),
        };
        (step, path)
    }
}

#[async_trait]
pub trait ImageOps: Send + Sync {
    fn image(&self) -> &Image;

    /// Network lookups needed before planning, such as following a
    /// "latest" redirect
    async fn resolve(&mut self, _downloader: &Downloader) -> anyhow::Result<()> {
        Ok(())
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan>;

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan>;

    fn reinstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(self.uninstall(ctx)?.then(self.install(ctx)?))
    }
}

/// Restores user configuration of an installed image
pub trait ImageConfig: Send + Sync {
    fn image_id(&self) -> ImageId;

    fn config(&self, ctx: &ImageContext) -> anyhow::Result<Plan>;
}

/// The package of images that carry a fetch request
pub(crate) fn required_fetch(image: &Image) -> anyhow::Result<&DownloadRequest> {
    image
        .package
        .fetch
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("image {} has no download request", image.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphenated_ids() {
        assert_eq!(
            "jetbrains-toolbox".parse(),
            Ok(ImageId::Desktop(DesktopImageId::JetBrainsToolbox))
        );
        assert_eq!(
            "intellij-idea".parse(),
            Ok(ImageId::JetBrains(JetBrainsImageId::IntellijIdea))
        );
        assert_eq!("vscode".parse(), Ok(ImageId::Desktop(DesktopImageId::VsCode)));
        assert_eq!("rust".parse(), Ok(ImageId::Server(ServerImageId::Rust)));
    }

    #[test]
    fn rejects_unknown_ids() {
        assert_eq!(
            "Rust".parse::<ImageId>(),
            Err(UnknownImageId("Rust".into()))
        );
        assert_eq!(
            "jetbrains".parse::<ImageId>().unwrap_err().to_string(),
            "String ID jetbrains not found in the image repository"
        );
    }

    #[test]
    fn ids_round_trip_through_display() {
        for id in ImageId::all() {
            assert_eq!(id.to_string().parse::<ImageId>(), Ok(id));
        }
    }

    #[test]
    fn lists_every_category_in_order() {
        let ids: Vec<String> = ImageId::all().map(|id| id.to_string()).collect();
        assert_eq!(
            ids,
            &[
                "rust",
                "go",
                "sdkman",
                "java",
                "gradle",
                "nvm",
                "node",
                "miniconda",
                "zoom",
                "vscode",
                "jetbrains-toolbox",
                "intellij-idea",
                "webstorm",
                "rustrover",
                "clion",
                "pycharm",
                "goland",
                "datagrip",
            ]
        );
    }
}
