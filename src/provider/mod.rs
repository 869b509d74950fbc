//! Provider adapters - translate one remote catalog into canonical records.
//!
//! # Architecture
//!
//! Each provider follows the same layering:
//! - **DTOs** (`<provider>/dto.rs`) - exact upstream response shapes
//! - **Adapter** (`<provider>/adapter.rs`) - the only DTO -> canonical conversion
//! - **Client** (`<provider>/client.rs`) - HTTP transport, implements [`ProviderAdapter`]
//!
//! Default filling for absent-but-required fields lives in [`normalize`],
//! so every provider applies the same policy.

pub mod discogs;
pub mod musicbrainz;
pub mod normalize;

use async_trait::async_trait;

use crate::model::{ChildrenPage, ProviderInfo, ReleaseRecord, SearchResultPage};

pub use normalize::{ReleaseDraft, TrackDraft};

/// Errors raised by provider adapters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Transport failure, remote 5xx, or any other unexpected status
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    /// The response could not be decoded into the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The adapter was asked for a search type it does not implement
    #[error("Unsupported search type: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// Whether re-issuing the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Network(_) | ProviderError::Timeout(_) | ProviderError::RateLimited
        )
    }

    /// Classify a `reqwest` transport error.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Pagination cursor, passed explicitly on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub per_page: usize,
    pub offset: usize,
}

impl PageCursor {
    pub fn new(per_page: usize, offset: usize) -> Self {
        Self { per_page, offset }
    }

    /// Cursor for the page after this one.
    pub fn next(self) -> Self {
        Self {
            offset: self.offset + self.per_page,
            ..self
        }
    }

    /// One-based page number for page-oriented APIs.
    pub fn page_number(self) -> usize {
        self.offset / self.per_page.max(1) + 1
    }

    /// Rows to drop from the start of [`page_number`](Self::page_number)
    /// when `offset` is not aligned to `per_page`.
    pub fn skip_within_page(self) -> usize {
        self.offset % self.per_page.max(1)
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            per_page: 25,
            offset: 0,
        }
    }
}

/// A search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    /// Key from [`ProviderInfo::search_types`]
    pub search_type: String,
    /// Key from [`ProviderInfo::search_filters`] for `search_type`
    pub filter: Option<String>,
    pub cursor: PageCursor,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, search_type: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            search_type: search_type.into(),
            filter: None,
            cursor: PageCursor::default(),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_cursor(mut self, cursor: PageCursor) -> Self {
        self.cursor = cursor;
        self
    }
}

/// Capability set implemented once per remote source.
///
/// Implement this trait to add a provider, or to create mocks for tests.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Static, side-effect-free description of search types and filters.
    fn describe_provider(&self) -> ProviderInfo;

    /// Search the remote catalog.
    ///
    /// `total_results` must be reported independently of the page size.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage, ProviderError>;

    /// List the releases of an intermediate entity (artist, label).
    async fn fetch_children(
        &self,
        search_type: &str,
        id: &str,
        cursor: PageCursor,
    ) -> Result<ChildrenPage, ProviderError>;

    /// Fetch one release and normalize it into the canonical shape.
    async fn fetch_release(&self, id: &str) -> Result<ReleaseRecord, ProviderError>;
}
