//! Adapter layer: Convert MusicBrainz DTOs to canonical records
//!
//! This is the ONLY place where DTO types are converted to canonical types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use serde::{Deserialize, Serialize};

use super::dto;
use crate::model::{ChildrenPage, ParentInfo, ReleaseRecord, SearchResult, SearchResultPage};
use crate::provider::normalize::{ReleaseDraft, TrackDraft, format_duration_ms, non_blank};

const SITE_URL: &str = "https://musicbrainz.org";
const COVER_ART_URL: &str = "https://coverartarchive.org";

/// Desired cover art size for image URLs handed to the image resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverSize {
    /// 250px thumbnail
    Small,
    /// 500px thumbnail (default)
    #[default]
    Medium,
    /// 1200px thumbnail
    Large,
    /// Original full-size image
    Original,
}

impl CoverSize {
    fn suffix(self) -> &'static str {
        match self {
            CoverSize::Small => "-250",
            CoverSize::Medium => "-500",
            CoverSize::Large => "-1200",
            CoverSize::Original => "",
        }
    }
}

/// Convert a release search response into a page.
pub fn to_release_page(response: dto::ReleaseSearchResponse) -> SearchResultPage {
    SearchResultPage {
        total_results: response.count,
        results: response.releases.into_iter().map(to_release_result).collect(),
    }
}

/// Convert an artist search response into a page.
pub fn to_artist_page(response: dto::ArtistSearchResponse) -> SearchResultPage {
    let results = response
        .artists
        .into_iter()
        .map(|artist| SearchResult {
            title: with_disambiguation(artist.name, artist.disambiguation),
            provider_url: Some(format!("{}/artist/{}", SITE_URL, artist.id)),
            id: artist.id,
            ..Default::default()
        })
        .collect();

    SearchResultPage {
        total_results: response.count,
        results,
    }
}

/// Convert a label search response into a page.
pub fn to_label_page(response: dto::LabelSearchResponse) -> SearchResultPage {
    let results = response
        .labels
        .into_iter()
        .map(|label| SearchResult {
            title: with_disambiguation(label.name, label.disambiguation),
            provider_url: Some(format!("{}/label/{}", SITE_URL, label.id)),
            id: label.id,
            ..Default::default()
        })
        .collect();

    SearchResultPage {
        total_results: response.count,
        results,
    }
}

/// Convert a browse response plus optional parent lookup into a children page.
pub fn to_children_page(
    response: dto::ReleaseBrowseResponse,
    parent_kind: &str,
    parent: Option<dto::EntityLookup>,
) -> ChildrenPage {
    let info = parent.map(|p| ParentInfo {
        provider_url: Some(format!("{}/{}/{}", SITE_URL, parent_kind, p.id)),
        description: non_blank(p.disambiguation),
        name: Some(p.name),
        image_url: None,
    });

    ChildrenPage {
        info,
        page: SearchResultPage {
            total_results: response.release_count,
            results: response.releases.into_iter().map(to_release_result).collect(),
        },
    }
}

fn to_release_result(release: dto::Release) -> SearchResult {
    let (label, catalog_number) = first_label(&release.label_info);
    let title = match release.date.as_deref().and_then(|d| d.split('-').next()) {
        Some(year) if !year.is_empty() => {
            format!("{} ({})", release.title.clone().unwrap_or_default(), year)
        }
        _ => release.title.clone().unwrap_or_default(),
    };

    SearchResult {
        thumbnail_url: cover_url(&release, CoverSize::Small),
        provider_url: Some(format!("{}/release/{}", SITE_URL, release.id)),
        release_artist: build_artist_string(&release.artist_credit),
        release_format: build_format_string(&release.media),
        release_label: label,
        release_catalog_number: catalog_number,
        id: release.id,
        title,
    }
}

/// Convert a release lookup into a canonical record.
pub fn to_release(release: dto::Release, cover_size: CoverSize) -> ReleaseRecord {
    let (label, catalog_number) = first_label(&release.label_info);
    let image_urls: Vec<String> = cover_url(&release, cover_size).into_iter().collect();

    let mut draft = ReleaseDraft {
        title: release.title.clone(),
        artist: build_artist_string(&release.artist_credit),
        label,
        catalog_number,
        format: build_format_string(&release.media),
        country: release.country.clone(),
        release_date: release.date.clone(),
        notes: release.disambiguation.clone(),
        image_urls,
        primary_image: Some(0),
        ..Default::default()
    };

    draft.add_categories(extract_genres(&release.genres));
    if let Some(ref group) = release.release_group {
        draft.add_categories(extract_genres(&group.genres));
    }

    // A lookup without media has no track list at all
    if !release.media.is_empty() {
        let multi_disc = release.media.len() > 1;
        let tracks = release
            .media
            .iter()
            .flat_map(|medium| {
                medium
                    .tracks
                    .iter()
                    .map(move |track| to_track_draft(track, medium.position, multi_disc))
            })
            .collect();
        draft.tracks = Some(tracks);
    }

    draft.finish()
}

fn to_track_draft(track: &dto::Track, disc: Option<u32>, multi_disc: bool) -> TrackDraft {
    let number = non_blank(track.number.clone()).or_else(|| track.position.map(|p| p.to_string()));
    let position = match (number, disc) {
        (Some(n), Some(d)) if multi_disc => Some(format!("{}-{}", d, n)),
        (number, _) => number,
    };

    TrackDraft {
        position,
        title: track.title.clone(),
        duration: track.length.map(format_duration_ms),
        artist: build_artist_string(&track.artist_credit),
        notes: None,
        lyrics: None,
    }
}

/// Build a combined artist string from artist credits
fn build_artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        // Use credited name if available, otherwise official name
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);

        // Add join phrase if present (e.g., " & ", " feat. ")
        if let Some(ref join) = credit.joinphrase {
            result.push_str(join);
        }
    }

    Some(result)
}

/// "2×CD" style summary of the media formats.
fn build_format_string(media: &[dto::Medium]) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for format in media.iter().filter_map(|m| m.format.as_deref()) {
        match counts.iter_mut().find(|(name, _)| name == format) {
            Some((_, count)) => *count += 1,
            None => counts.push((format.to_string(), 1)),
        }
    }

    if counts.is_empty() {
        return None;
    }

    let parts: Vec<String> = counts
        .into_iter()
        .map(|(name, count)| {
            if count > 1 {
                format!("{}x{}", count, name)
            } else {
                name
            }
        })
        .collect();
    Some(parts.join(" + "))
}

fn first_label(label_info: &[dto::LabelInfo]) -> (Option<String>, Option<String>) {
    let Some(info) = label_info.first() else {
        return (None, None);
    };
    (
        info.label.as_ref().map(|l| l.name.clone()),
        info.catalog_number.clone(),
    )
}

fn cover_url(release: &dto::Release, size: CoverSize) -> Option<String> {
    release
        .cover_art_archive
        .as_ref()
        .filter(|caa| caa.front)
        .map(|_| format!("{}/release/{}/front{}", COVER_ART_URL, release.id, size.suffix()))
}

fn with_disambiguation(name: String, disambiguation: Option<String>) -> String {
    match non_blank(disambiguation) {
        Some(d) => format!("{} ({})", name, d),
        None => name,
    }
}

/// Extract genres sorted by vote count (most popular first), capitalized for display
fn extract_genres(genres: &[dto::Genre]) -> Vec<String> {
    let mut sorted: Vec<_> = genres.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));

    sorted
        .into_iter()
        .map(|g| {
            // Capitalize first letter of each word for display
            g.name
                .split_whitespace()
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
