pub mod checksum;
pub mod gpg;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use self::checksum::read_sha256;
use self::gpg::GpgKey;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("URL {0} is not HTTPS protocol")]
    InsecureUrl(String),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to download {url}: {status}")]
    UnexpectedStatus { url: Url, status: StatusCode },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Downloaded file {} failed {integrity} integrity check", .path.display())]
    Integrity { path: PathBuf, integrity: String },

    #[error("Unable to check integrity of {}: {reason}", .path.display())]
    IntegrityCheck { path: PathBuf, reason: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Integrity {
    None,
    Sha256([u8; 32]),
    /// Imports the vendor key and checks its fingerprint. The downloaded file
    /// itself is not verified against the key, only the key is.
    Gpg(GpgKey),
}

impl fmt::Display for Integrity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Integrity::None => write!(f, "none"),
            Integrity::Sha256(hash) => write!(f, "sha256 {}", hex::encode(hash)),
            Integrity::Gpg(key) => write!(f, "gpg {}", key.fingerprint()),
        }
    }
}

impl Integrity {
    /// # Errors
    /// Fails if the file can't be hashed or the GPG key can't be installed
    pub async fn check(&self, path: &Path) -> anyhow::Result<bool> {
        match self {
            Integrity::None => Ok(true),
            Integrity::Sha256(expected) => Ok(read_sha256(path).await? == *expected),
            Integrity::Gpg(key) => key.install().await.map(|()| true),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DownloadRequest {
    url: Url,
    integrity: Integrity,
}

impl DownloadRequest {
    /// # Errors
    /// Only absolute `https://` URLs are accepted
    pub fn new(url: &str, integrity: Integrity) -> Result<Self, DownloadError> {
        if !url.starts_with("https://") {
            return Err(DownloadError::InsecureUrl(url.to_string()));
        }
        let url = Url::parse(url).map_err(|err| DownloadError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self { url, integrity })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn integrity(&self) -> &Integrity {
        &self.integrity
    }

    /// Last path segment of the URL, used to name the file in the work dir
    #[must_use]
    pub fn filename(&self) -> String {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or("download")
            .to_string()
    }
}

#[derive(Clone)]
pub struct Downloader {
    client: Arc<Client>,
}

impl Downloader {
    /// # Errors
    /// Fails if the TLS backend can't be initialized
    pub fn new() -> Result<Self, DownloadError> {
        let client = Client::builder().redirect(Policy::limited(10)).build()?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Follow redirects of `url` with a HEAD request and return the final URL
    /// # Errors
    /// Fails on HTTP errors
    pub async fn resolve_redirect(&self, url: &Url) -> Result<Url, DownloadError> {
        let res = self.client.head(url.clone()).send().await?;
        Ok(res.url().clone())
    }

    /// Download into a new file at `path` and check its integrity.
    /// A file failing the check is removed.
    /// # Errors
    /// Fails on HTTP/IO errors, if `path` already exists, or on integrity mismatch
    pub async fn fetch(&self, req: &DownloadRequest, path: &Path) -> Result<(), DownloadError> {
        let url = req.url();
        debug!("Fetching {url}");

        let res = self.client.get(url.clone()).send().await?;
        ensure_success(url, res.status())?;
        let bytes = res.bytes().await?;

        write_verified(req, &bytes, path).await
    }
}

fn ensure_success(url: &Url, status: StatusCode) -> Result<(), DownloadError> {
    if status.is_success() {
        return Ok(());
    }
    Err(DownloadError::UnexpectedStatus {
        url: url.clone(),
        status,
    })
}

/// Write `bytes` to a new file at `path`, then check it against the
/// integrity of `req`. A file failing the check is removed.
async fn write_verified(
    req: &DownloadRequest,
    bytes: &[u8],
    path: &Path,
) -> Result<(), DownloadError> {
    let io_err = |source| DownloadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(io_err)?;
    file.write_all(bytes).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;
    drop(file);

    let verdict = match req.integrity().check(path).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(DownloadError::Integrity {
            path: path.to_path_buf(),
            integrity: req.integrity().to_string(),
        }),
        Err(err) => Err(DownloadError::IntegrityCheck {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        }),
    };

    if verdict.is_err() {
        if let Err(err) = tokio::fs::remove_file(path).await {
            warn!("Unable to remove rejected download {}: {err}", path.display());
        }
    }
    verdict
}
