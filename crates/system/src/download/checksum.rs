use std::path::{Path, PathBuf};

use anyhow::Context;
use memmap2::MmapOptions;
use sha2::{Digest, Sha256};

const CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Compute SHA-256 for a downloaded artifact.
///
/// IDE tarballs are close to a gigabyte, so hashing runs in `spawn_blocking`
/// over a memory map instead of on the async runtime.
pub async fn read_sha256(path: &Path) -> anyhow::Result<[u8; 32]> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_sha256_blocking(path))
        .await
        .context("checksum task failed")?
}

fn read_sha256_blocking(path: PathBuf) -> anyhow::Result<[u8; 32]> {
    let file = std::fs::File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("reading metadata for {}", path.display()))?
        .len();

    // Zero-length files can't be mapped
    if len == 0 {
        return Ok(Sha256::digest(b"").into());
    }

    // SAFETY: Mapping a read-only file descriptor for read-only access.
    // Concurrent file modification may change hash determinism, but not memory safety.
    let mmap = unsafe {
        MmapOptions::new()
            .map(&file)
            .with_context(|| format!("mmap {}", path.display()))?
    };

    let mut hasher = Sha256::new();
    for chunk in mmap.chunks(CHUNK_SIZE) {
        hasher.update(chunk);
    }

    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn hashes_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"hello world")?;

        let hash = read_sha256(file.path()).await?;
        assert_eq!(
            hex::encode(hash),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        Ok(())
    }

    #[tokio::test]
    async fn hashes_empty_file() -> anyhow::Result<()> {
        let file = tempfile::NamedTempFile::new()?;

        let hash = read_sha256(file.path()).await?;
        assert_eq!(
            hex::encode(hash),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        Ok(())
    }

    #[tokio::test]
    async fn fails_on_missing_file() {
        let res = read_sha256(Path::new("/nonexistent/system-artifact")).await;
        assert!(res.is_err());
    }
}
