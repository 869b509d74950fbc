//! Discogs API Data Transfer Objects
//!
//! These types match what the Discogs API returns.
//! DO NOT use these types outside the discogs module - convert to canonical types.
//!
//! API Reference: https://www.discogs.com/developers
//!
//! Endpoints used:
//! - `/database/search` - release, artist, label and catalog number search
//! - `/artists/{id}/releases`, `/labels/{id}/releases` - child listings
//! - `/artists/{id}`, `/labels/{id}` - parent profile
//! - `/releases/{id}` - full release

use serde::{Deserialize, Serialize};

/// Page-based pagination block present on every list response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    /// Total number of items across all pages
    pub items: u64,
}

/// `/database/search` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One search hit; shape varies slightly by `type`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchHit {
    pub id: u64,
    /// release, master, artist or label
    #[serde(rename = "type")]
    pub result_type: Option<String>,
    /// For releases this is "Artist - Title"
    pub title: Option<String>,
    pub thumb: Option<String>,
    /// Site-relative URL, e.g. "/artist/45-Aphex-Twin"
    pub uri: Option<String>,
    #[serde(default)]
    pub format: Vec<String>,
    #[serde(default)]
    pub label: Vec<String>,
    pub catno: Option<String>,
    pub country: Option<String>,
}

/// `/artists/{id}/releases` and `/labels/{id}/releases` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleasesResponse {
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub releases: Vec<ChildRelease>,
}

/// One release in an artist or label listing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChildRelease {
    pub id: u64,
    /// "release" or "master" (artist listings only)
    #[serde(rename = "type")]
    pub release_type: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub format: Option<String>,
    pub label: Option<String>,
    pub catno: Option<String>,
    pub thumb: Option<String>,
    /// For masters, the id of the canonical release
    pub main_release: Option<u64>,
    pub year: Option<u32>,
}

/// `/artists/{id}` and `/labels/{id}` response (shared fields only)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    pub id: u64,
    pub name: Option<String>,
    /// Biography / label history, Discogs markup
    pub profile: Option<String>,
    /// Absolute URL on discogs.com
    pub uri: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// `/releases/{id}` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseResponse {
    pub id: u64,
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistCredit>,
    #[serde(default)]
    pub labels: Vec<LabelCredit>,
    #[serde(default)]
    pub formats: Vec<Format>,
    pub country: Option<String>,
    /// YYYY, YYYY-MM-DD, or YYYY-00-00 when only the year is known
    pub released: Option<String>,
    pub notes: Option<String>,
    /// Release credits (producers, engineers, ...)
    #[serde(default)]
    pub extraartists: Vec<ArtistCredit>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub tracklist: Option<Vec<Track>>,
    pub uri: Option<String>,
}

/// Artist credit, used for release, track and extra artists
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    pub name: String,
    /// Artist name variation as credited on this release
    pub anv: Option<String>,
    /// Join phrase to the next credit ("&", ",", "Feat.")
    pub join: Option<String>,
    /// Credit role (extra artists only)
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelCredit {
    pub name: String,
    pub catno: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Format {
    pub name: String,
    pub qty: Option<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    /// "primary" or "secondary"
    #[serde(rename = "type")]
    pub image_type: Option<String>,
    pub uri: Option<String>,
    pub uri150: Option<String>,
}

/// Tracklist entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    /// Free text: "1", "A1", "CD2-05", or empty
    pub position: Option<String>,
    /// "track", "heading" or "index"
    #[serde(rename = "type_")]
    pub track_type: Option<String>,
    pub title: Option<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistCredit>,
    #[serde(default)]
    pub extraartists: Vec<ArtistCredit>,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub message: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================
