use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;

use super::ImageId;

/// Reads per-image JSON data: `<root>/<id>.json` holds version and integrity
/// info, `<root>/config/<id>.json` holds user configuration
#[derive(Clone, Debug)]
pub struct ImageInfoLoader {
    root: PathBuf,
}

impl ImageInfoLoader {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn info_path(&self, id: &ImageId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    #[must_use]
    pub fn config_path(&self, id: &ImageId) -> PathBuf {
        self.root.join("config").join(format!("{id}.json"))
    }

    /// # Errors
    /// Fails if the info file is missing or doesn't match `T`
    pub async fn load<T: DeserializeOwned>(&self, id: &ImageId) -> anyhow::Result<T> {
        read_json(&self.info_path(id))
            .await
            .with_context(|| format!("loading info of image {id}"))
    }

    /// # Errors
    /// Fails if the config file is missing or doesn't match `T`
    pub async fn load_config<T: DeserializeOwned>(&self, id: &ImageId) -> anyhow::Result<T> {
        read_json(&self.config_path(id))
            .await
            .with_context(|| format!("loading config of image {id}"))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let this =
        serde_json::from_str(&content).with_context(|| format!("deserializing {}", path.display()))?;
    Ok(this)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ServerImageId;
    use crate::image::test::test_loader;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Versioned {
        version: String,
    }

    #[test]
    fn builds_paths() {
        let loader = ImageInfoLoader::new("image");
        let id = ImageId::Server(ServerImageId::Go);

        assert_eq!(loader.info_path(&id), Path::new("image/go.json"));
        assert_eq!(loader.config_path(&id), Path::new("image/config/go.json"));
    }

    #[tokio::test]
    async fn loads_info_file() -> anyhow::Result<()> {
        let info: Versioned = test_loader().load(&ImageId::Server(ServerImageId::Go)).await?;

        assert_eq!(info.version, "1.22.5");
        Ok(())
    }

    #[tokio::test]
    async fn reports_missing_file() {
        let loader = ImageInfoLoader::new("/nonexistent");
        let err = loader
            .load::<Versioned>(&ImageId::Server(ServerImageId::Go))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "loading info of image go");
        assert_eq!(
            err.chain().nth(1).map(ToString::to_string),
            Some("reading /nonexistent/go.json".to_string())
        );
    }
}
