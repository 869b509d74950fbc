//! Canonical data models shared by every adapter.
//!
//! Provider adapters produce these records, entity adapters consume them.
//! Nothing in here knows about a particular remote service or storage
//! backend; adding a provider never changes these types.
//!
//! # Records
//!
//! - [`ReleaseRecord`] / [`TrackRecord`] - one fully normalized release
//! - [`SearchResult`] / [`SearchResultPage`] - rows of a search or browse page
//! - [`ProviderInfo`] / [`EntityTypeInfo`] - static adapter descriptions
//! - [`SaveResult`] - outcome of persisting a release

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Title substituted for a track whose source omitted one.
pub const UNTITLED_TRACK: &str = "Untitled";

/// Position of a track within its release.
///
/// Providers report positions as free text ("A1", "2", "1-05"), which is
/// kept verbatim. When the source has no position the track's zero-based
/// sequence index is assigned instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackPosition {
    /// Sequence index assigned because the source had no position
    Index(usize),
    /// Position as reported by the provider
    Label(String),
}

impl fmt::Display for TrackPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// One track of a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub position: TrackPosition,
    /// Never empty; [`UNTITLED_TRACK`] when the source had no title
    pub title: String,
    /// Free-form duration, usually "MM:SS"
    pub duration: Option<String>,
    /// Track artist for compilations and splits
    pub artist: Option<String>,
    /// Rich text, stored as-is
    pub notes: Option<String>,
    /// Rich text, stored as-is
    pub lyrics: Option<String>,
}

impl TrackRecord {
    /// A track with only position and title set.
    pub fn new(position: TrackPosition, title: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
            duration: None,
            artist: None,
            notes: None,
            lyrics: None,
        }
    }
}

/// Remote images of a release and which one is the primary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseImages {
    pub urls: Vec<String>,
    #[serde(default)]
    pub primary_index: usize,
}

impl ReleaseImages {
    /// URL of the primary image, falling back to the first image when
    /// `primary_index` is out of range.
    pub fn primary_url(&self) -> Option<&str> {
        self.urls
            .get(self.primary_index)
            .or_else(|| self.urls.first())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// A fully normalized release.
///
/// `title`, `artist` and `tracks` are always present (possibly empty).
/// Track order is the release's running order and is preserved end to end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub title: String,
    /// Primary artist, may be a collective name such as "Various"
    pub artist: String,
    pub label: Option<String>,
    pub catalog_number: Option<String>,
    pub format: Option<String>,
    pub country: Option<String>,
    pub release_date: Option<String>,
    /// Rich text, stored as-is
    pub credits: Option<String>,
    /// Rich text, stored as-is
    pub notes: Option<String>,
    /// Genres, styles and similar taxonomies merged, first occurrence wins
    pub categories: Vec<String>,
    pub images: ReleaseImages,
    pub tracks: Vec<TrackRecord>,
}

impl ReleaseRecord {
    /// Track list as handed to a presentation layer.
    pub fn track_listing(&self, teaser: bool, page: bool) -> TrackListing<'_> {
        TrackListing {
            tracks: &self.tracks,
            teaser,
            page,
        }
    }
}

/// Ordered track list plus the display-mode flags a renderer receives.
#[derive(Debug, Clone, Copy)]
pub struct TrackListing<'a> {
    pub tracks: &'a [TrackRecord],
    /// Rendered in a compact teaser context
    pub teaser: bool,
    /// Rendered as a full page
    pub page: bool,
}

/// One row of a search or browse page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Provider-scoped opaque id
    pub id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub provider_url: Option<String>,
    // Release previews, only filled when the row is a release
    pub release_artist: Option<String>,
    pub release_format: Option<String>,
    pub release_label: Option<String>,
    pub release_catalog_number: Option<String>,
}

/// A page of results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultPage {
    /// Total matches across all pages, independent of page size
    pub total_results: u64,
    pub results: Vec<SearchResult>,
}

impl SearchResultPage {
    /// Enforce page invariants: at most `per_page` rows, and a total that
    /// is never smaller than the rows actually returned.
    pub fn clamped(mut self, per_page: usize) -> Self {
        if self.results.len() > per_page {
            tracing::debug!(
                "Provider returned {} rows for a page of {}, truncating",
                self.results.len(),
                per_page
            );
            self.results.truncate(per_page);
        }
        let returned = self.results.len() as u64;
        if self.total_results < returned {
            tracing::warn!(
                "Provider reported total {} below returned rows {}",
                self.total_results,
                returned
            );
            self.total_results = returned;
        }
        self
    }
}

/// Description of the parent entity (artist, label) being browsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub provider_url: Option<String>,
    pub image_url: Option<String>,
}

/// Result of drilling from an intermediate entity into its releases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildrenPage {
    pub info: Option<ParentInfo>,
    pub page: SearchResultPage,
}

/// Static description of a provider adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub description: String,
    /// Machine key -> human label
    pub search_types: BTreeMap<String, String>,
    /// Search types whose rows are releases rather than intermediate entities
    pub returns_releases: BTreeSet<String>,
    /// Search type -> (filter key -> human label); absent types have no filters
    pub search_filters: BTreeMap<String, BTreeMap<String, String>>,
}

impl ProviderInfo {
    pub fn has_search_type(&self, search_type: &str) -> bool {
        self.search_types.contains_key(search_type)
    }

    pub fn returns_releases(&self, search_type: &str) -> bool {
        self.returns_releases.contains(search_type)
    }

    /// Filters defined for a search type, if any.
    pub fn filters_for(&self, search_type: &str) -> Option<&BTreeMap<String, String>> {
        self.search_filters
            .get(search_type)
            .filter(|filters| !filters.is_empty())
    }
}

/// Static description of what kind of host object an entity adapter fills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeInfo {
    pub name: String,
    pub description: String,
}

/// Outcome of persisting a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    pub success: bool,
    pub message: String,
    /// Id of the persisted object, only on success
    pub id: Option<String>,
}

impl SaveResult {
    pub fn saved(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id: Some(id.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            id: None,
        }
    }
}
