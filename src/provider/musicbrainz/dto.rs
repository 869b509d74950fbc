//! MusicBrainz API Data Transfer Objects
//!
//! These types match EXACTLY what the MusicBrainz API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the musicbrainz module - convert to canonical types.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API

use serde::{Deserialize, Serialize};

/// `/release?query=` search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseSearchResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// `/artist?query=` search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

/// `/label?query=` search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelSearchResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// `/release?artist=` and `/release?label=` browse response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseBrowseResponse {
    #[serde(default)]
    pub release_count: u64,
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// Release (album/single/EP), used by search, browse and lookup
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    /// MusicBrainz release ID
    pub id: String,
    pub title: Option<String>,
    /// Release status (Official, Bootleg, etc.)
    pub status: Option<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub date: Option<String>,
    /// Country code
    pub country: Option<String>,
    pub disambiguation: Option<String>,
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    pub label_info: Vec<LabelInfo>,
    /// Media (discs) in this release
    #[serde(default)]
    pub media: Vec<Medium>,
    pub release_group: Option<ReleaseGroup>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub cover_art_archive: Option<CoverArtArchive>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    /// The artist
    pub artist: Artist,
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
}

/// Artist info
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    /// MusicBrainz artist ID
    pub id: String,
    /// Official artist name
    pub name: String,
    /// Sort name (e.g., "Beatles, The")
    pub sort_name: Option<String>,
    /// Artist type (Person, Group, etc.)
    #[serde(rename = "type")]
    pub artist_type: Option<String>,
    pub disambiguation: Option<String>,
    pub country: Option<String>,
}

/// Label info
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub label_type: Option<String>,
    pub disambiguation: Option<String>,
    pub country: Option<String>,
}

/// Label and catalog number of a release
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabelInfo {
    pub catalog_number: Option<String>,
    pub label: Option<Label>,
}

/// Release group (e.g., "Abbey Road" across all editions)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    /// MusicBrainz release group ID
    pub id: String,
    pub title: Option<String>,
    /// Primary type (Album, Single, EP, etc.)
    pub primary_type: Option<String>,
    #[serde(default)]
    pub secondary_types: Vec<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Medium (disc) within a release
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Medium {
    /// Position in release (disc number)
    pub position: Option<u32>,
    /// Format (CD, Vinyl, Digital, etc.)
    pub format: Option<String>,
    /// Number of tracks
    pub track_count: Option<u32>,
    /// Tracks on this medium
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Track on a medium
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Track {
    /// Track position on medium
    pub position: Option<u32>,
    /// Track number as printed ("5", "A1")
    pub number: Option<String>,
    /// Track title (may differ from recording title)
    pub title: Option<String>,
    /// Track length in milliseconds
    pub length: Option<u64>,
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
}

/// Genre tag with vote count
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Genre {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

/// Cover Art Archive availability flags
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoverArtArchive {
    #[serde(default)]
    pub front: bool,
    #[serde(default)]
    pub count: u32,
}

/// `/artist/{id}` and `/label/{id}` lookup (shared fields)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntityLookup {
    pub id: String,
    pub name: String,
    pub disambiguation: Option<String>,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub country: Option<String>,
}

/// Error response from MusicBrainz API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
    pub help: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
