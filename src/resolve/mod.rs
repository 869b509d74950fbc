//! Side-effect resolvers - best-effort enrichment applied before persisting.
//!
//! - [`CategoryResolver`] turns category strings into taxonomy term references
//! - [`ImageResolver`] downloads the primary release image into an asset store
//!
//! Neither resolver ever fails an import. Problems are reported as
//! [`ResolverWarning`]s and the release is saved without the affected
//! category or image.
//!
//! Storage and transport sit behind [`TaxonomyStore`], [`ImageFetcher`] and
//! [`AssetStore`] so hosts can plug in their own backends and tests can
//! substitute mocks.

mod assets;
mod category;
mod image;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use assets::FileAssetStore;
pub use category::{CategoryResolution, CategoryResolver};
pub use image::{HttpImageFetcher, ImageResolution, ImageResolver, file_name_from_url};

/// Reference to a taxonomy term in the host's storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRef {
    /// Host-scoped opaque id
    pub id: String,
    pub name: String,
}

/// Reference to a stored image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Where the host can find the asset (path or URI)
    pub uri: String,
    pub file_name: String,
    pub mime_type: String,
    /// Hex SHA-256 of the stored bytes
    pub sha256: String,
    pub size_bytes: u64,
    /// URL the image was fetched from
    pub source_url: String,
}

/// A fully downloaded image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub url: String,
}

/// Errors raised inside resolvers; never surfaced as import failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty image payload from {0}")]
    EmptyPayload(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for ResolveError {
    fn from(err: std::io::Error) -> Self {
        ResolveError::Storage(err.to_string())
    }
}

/// Which resolver produced a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    Category,
    Image,
}

/// A non-fatal resolver failure, recorded alongside the prepared release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverWarning {
    pub kind: WarningKind,
    /// Category name or image URL
    pub subject: String,
    pub reason: String,
}

impl fmt::Display for ResolverWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            WarningKind::Category => "category",
            WarningKind::Image => "image",
        };
        write!(f, "{} '{}' skipped: {}", kind, self.subject, self.reason)
    }
}

/// Taxonomy lookup and creation within a named vocabulary.
#[async_trait]
pub trait TaxonomyStore: Send + Sync {
    /// Find a term by exact, case-sensitive name.
    async fn find_term(&self, vocabulary: &str, name: &str)
    -> Result<Option<TermRef>, ResolveError>;

    /// Create a new term.
    async fn create_term(&self, vocabulary: &str, name: &str) -> Result<TermRef, ResolveError>;
}

/// Downloads images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the complete image body; partial bodies are never returned.
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ResolveError>;
}

/// Persists downloaded images as host assets.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn store(&self, file_name: &str, image: &FetchedImage) -> Result<AssetRef, ResolveError>;
}
