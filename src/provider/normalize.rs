//! Default filling for provider output.
//!
//! Adapters copy whatever the upstream payload has into a [`ReleaseDraft`]
//! (every field optional) and call [`ReleaseDraft::finish`]. Required
//! fields are filled here so the mediator and entity adapters never check
//! for absent values:
//!
//! - missing release `title` / `artist` become empty strings
//! - a missing track list becomes an empty list
//! - a missing track position becomes the track's zero-based index
//! - a missing track title becomes [`UNTITLED_TRACK`]

use crate::model::{ReleaseImages, ReleaseRecord, TrackPosition, TrackRecord, UNTITLED_TRACK};

/// Track data as extracted from a provider, before defaults.
#[derive(Debug, Clone, Default)]
pub struct TrackDraft {
    pub position: Option<String>,
    pub title: Option<String>,
    pub duration: Option<String>,
    pub artist: Option<String>,
    pub notes: Option<String>,
    pub lyrics: Option<String>,
}

impl TrackDraft {
    /// Apply defaults; `index` is the track's place in the release.
    pub fn finish(self, index: usize) -> TrackRecord {
        let position = match non_blank(self.position) {
            Some(label) => TrackPosition::Label(label),
            None => TrackPosition::Index(index),
        };

        TrackRecord {
            position,
            title: non_blank(self.title).unwrap_or_else(|| UNTITLED_TRACK.to_string()),
            duration: non_blank(self.duration),
            artist: non_blank(self.artist),
            notes: non_blank(self.notes),
            lyrics: non_blank(self.lyrics),
        }
    }
}

/// Release data as extracted from a provider, before defaults.
#[derive(Debug, Clone, Default)]
pub struct ReleaseDraft {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub label: Option<String>,
    pub catalog_number: Option<String>,
    pub format: Option<String>,
    pub country: Option<String>,
    pub release_date: Option<String>,
    pub credits: Option<String>,
    pub notes: Option<String>,
    pub categories: Vec<String>,
    pub image_urls: Vec<String>,
    pub primary_image: Option<usize>,
    pub tracks: Option<Vec<TrackDraft>>,
}

impl ReleaseDraft {
    /// Append category strings, skipping blanks and ones already present.
    pub fn add_categories<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for category in categories {
            let category = category.into();
            let category = category.trim();
            if category.is_empty() || self.categories.iter().any(|c| c == category) {
                continue;
            }
            self.categories.push(category.to_string());
        }
    }

    /// Apply defaults and produce the canonical record.
    pub fn finish(self) -> ReleaseRecord {
        let tracks = self
            .tracks
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, track)| track.finish(index))
            .collect();

        // `primary_image` indexes the unfiltered list
        let mut primary_index = 0;
        let mut image_urls = Vec::with_capacity(self.image_urls.len());
        for (index, url) in self.image_urls.into_iter().enumerate() {
            if url.trim().is_empty() {
                continue;
            }
            if self.primary_image == Some(index) {
                primary_index = image_urls.len();
            }
            image_urls.push(url);
        }

        ReleaseRecord {
            title: self.title.unwrap_or_default(),
            artist: self.artist.unwrap_or_default(),
            label: non_blank(self.label),
            catalog_number: non_blank(self.catalog_number),
            format: non_blank(self.format),
            country: non_blank(self.country),
            release_date: non_blank(self.release_date),
            credits: non_blank(self.credits),
            notes: non_blank(self.notes),
            categories: self.categories,
            images: ReleaseImages {
                urls: image_urls,
                primary_index,
            },
            tracks,
        }
    }
}

/// Treat whitespace-only strings as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Format a millisecond duration as "M:SS" (or "H:MM:SS").
pub fn format_duration_ms(ms: u64) -> String {
    let total = ms / 1000;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
