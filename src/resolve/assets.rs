//! Image asset storage on disk.
//!
//! Files are named after the source URL's basename, prefixed with a short
//! digest of the full URL so that covers sharing a basename (every Cover Art
//! Archive `front-500`) never collide. Re-importing the same URL replaces
//! the file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{AssetRef, AssetStore, FetchedImage, ResolveError};

/// Hex digits of the source URL digest used as a file name prefix
const SOURCE_PREFIX_LEN: usize = 12;

/// Directory-backed [`AssetStore`].
pub struct FileAssetStore {
    dir: PathBuf,
}

impl FileAssetStore {
    /// Create a store in the specified directory. The directory is created
    /// lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store in the default location (user data directory).
    pub fn default_location() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from(".data"))
            .join("discog-mediator")
            .join("images");
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AssetStore for FileAssetStore {
    async fn store(&self, file_name: &str, image: &FetchedImage) -> Result<AssetRef, ResolveError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let disk_name = stored_name(&image.url, file_name);
        let path = self.dir.join(&disk_name);
        let temp_path = self.dir.join(format!(".{}.part", disk_name));

        // Write to temp, then rename over any existing file
        let written = match tokio::fs::write(&temp_path, &image.data).await {
            Ok(()) => tokio::fs::rename(&temp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        let sha256 = hex_digest(&image.data);

        Ok(AssetRef {
            uri: path.display().to_string(),
            file_name: file_name.to_string(),
            mime_type: image.mime_type.clone(),
            sha256,
            size_bytes: image.data.len() as u64,
            source_url: image.url.clone(),
        })
    }
}

/// On-disk name: source URL digest prefix plus the display name.
fn stored_name(source_url: &str, file_name: &str) -> String {
    let digest = hex_digest(source_url.as_bytes());
    format!("{}-{}", &digest[..SOURCE_PREFIX_LEN], file_name)
}

fn hex_digest(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
