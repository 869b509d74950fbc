//! Adapter layer: Convert Discogs DTOs to canonical records
//!
//! This is the ONLY place where Discogs DTO types are converted to canonical
//! types. If Discogs changes their response format, only this file and
//! dto.rs need to change.

use super::dto;
use crate::model::{ChildrenPage, ParentInfo, ReleaseRecord, SearchResult, SearchResultPage};
use crate::provider::PageCursor;
use crate::provider::normalize::{ReleaseDraft, TrackDraft, non_blank};

const SITE_URL: &str = "https://www.discogs.com";

/// Convert a search response into a page.
///
/// Discogs pages are fixed-size, so rows before `cursor.offset` within the
/// requested page are dropped. Release previews are only filled when
/// `with_previews` is set (search types that return releases).
pub fn to_search_page(
    response: dto::SearchResponse,
    cursor: PageCursor,
    with_previews: bool,
) -> SearchResultPage {
    let results = response
        .results
        .into_iter()
        .skip(cursor.skip_within_page())
        .map(|hit| to_search_result(hit, with_previews))
        .collect();

    SearchResultPage {
        total_results: response.pagination.items,
        results,
    }
}

fn to_search_result(hit: dto::SearchHit, with_previews: bool) -> SearchResult {
    let full_title = hit.title.unwrap_or_default();
    let mut result = SearchResult {
        id: hit.id.to_string(),
        title: full_title.clone(),
        thumbnail_url: non_blank(hit.thumb),
        provider_url: hit.uri.as_deref().map(site_url),
        ..Default::default()
    };

    if with_previews {
        // Release hits are titled "Artist - Title"
        if let Some((artist, title)) = full_title.split_once(" - ") {
            result.release_artist = Some(clean_artist_name(artist));
            result.title = title.to_string();
        }
        result.release_format = join_non_empty(&hit.format, ", ");
        result.release_label = hit.label.into_iter().next();
        result.release_catalog_number = non_blank(hit.catno);
    }

    result
}

/// Convert an artist/label release listing into a children page.
pub fn to_children_page(
    response: dto::ReleasesResponse,
    info: Option<ParentInfo>,
    cursor: PageCursor,
) -> ChildrenPage {
    let results = response
        .releases
        .into_iter()
        .skip(cursor.skip_within_page())
        .map(to_child_result)
        .collect();

    ChildrenPage {
        info,
        page: SearchResultPage {
            total_results: response.pagination.items,
            results,
        },
    }
}

fn to_child_result(release: dto::ChildRelease) -> SearchResult {
    // Masters cannot be fetched as releases; point at their main release
    let id = match (release.release_type.as_deref(), release.main_release) {
        (Some("master"), Some(main)) => main,
        _ => release.id,
    };

    let title = match release.year {
        Some(year) if year > 0 => format!("{} ({})", release.title.unwrap_or_default(), year),
        _ => release.title.unwrap_or_default(),
    };

    SearchResult {
        id: id.to_string(),
        title,
        thumbnail_url: non_blank(release.thumb),
        provider_url: Some(format!("{}/release/{}", SITE_URL, id)),
        release_artist: non_blank(release.artist).map(|a| clean_artist_name(&a)),
        release_format: non_blank(release.format),
        release_label: non_blank(release.label),
        release_catalog_number: non_blank(release.catno),
    }
}

/// Convert an artist or label profile into the parent info block.
pub fn to_parent_info(profile: dto::Profile) -> ParentInfo {
    let image_url = profile
        .images
        .iter()
        .find(|i| i.image_type.as_deref() == Some("primary"))
        .or_else(|| profile.images.first())
        .and_then(|i| i.uri.clone());

    ParentInfo {
        name: non_blank(profile.name),
        description: non_blank(profile.profile),
        provider_url: non_blank(profile.uri),
        image_url,
    }
}

/// Convert a full release into a canonical record.
pub fn to_release(response: dto::ReleaseResponse) -> ReleaseRecord {
    let mut draft = ReleaseDraft {
        title: response.title,
        artist: build_artist_string(&response.artists),
        label: response.labels.first().map(|l| clean_artist_name(&l.name)),
        catalog_number: response.labels.first().and_then(|l| l.catno.clone()),
        format: build_format_string(&response.formats),
        country: response.country,
        release_date: response.released.map(|d| trim_unknown_date_parts(&d)),
        credits: build_credits(&response.extraartists),
        notes: response.notes,
        ..Default::default()
    };

    // Styles are the finer taxonomy, so they lead
    draft.add_categories(response.styles);
    draft.add_categories(response.genres);

    draft.primary_image = response
        .images
        .iter()
        .position(|i| i.image_type.as_deref() == Some("primary"));
    draft.image_urls = response
        .images
        .into_iter()
        .map(|i| i.uri.unwrap_or_default())
        .collect();

    draft.tracks = response.tracklist.map(|tracks| {
        tracks
            .into_iter()
            .filter(|t| t.track_type.as_deref() != Some("heading"))
            .map(to_track_draft)
            .collect()
    });

    draft.finish()
}

fn to_track_draft(track: dto::Track) -> TrackDraft {
    TrackDraft {
        position: track.position,
        title: track.title,
        duration: track.duration,
        artist: build_artist_string(&track.artists),
        notes: build_credits(&track.extraartists),
        lyrics: None,
    }
}

/// Build a combined artist string from credits, honoring join phrases.
fn build_artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for (i, credit) in credits.iter().enumerate() {
        let name = credit
            .anv
            .as_deref()
            .filter(|anv| !anv.is_empty())
            .unwrap_or(&credit.name);
        result.push_str(&clean_artist_name(name));

        if i + 1 < credits.len() {
            match credit.join.as_deref().map(str::trim) {
                Some(",") => result.push_str(", "),
                Some(join) if !join.is_empty() => {
                    result.push(' ');
                    result.push_str(join);
                    result.push(' ');
                }
                _ => result.push_str(", "),
            }
        }
    }

    Some(result)
}

/// One "Role - Name" line per credit.
fn build_credits(credits: &[dto::ArtistCredit]) -> Option<String> {
    let lines: Vec<String> = credits
        .iter()
        .map(|c| {
            let name = clean_artist_name(&c.name);
            match c.role.as_deref().map(str::trim) {
                Some(role) if !role.is_empty() => format!("{} - {}", role, name),
                _ => name,
            }
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// "Vinyl, LP, Album" per format, multiple formats joined with " + ".
fn build_format_string(formats: &[dto::Format]) -> Option<String> {
    let parts: Vec<String> = formats
        .iter()
        .map(|f| {
            let mut part = f.name.clone();
            if let Some(qty) = f.qty.as_deref().filter(|q| *q != "1" && !q.is_empty()) {
                part = format!("{} x {}", qty, part);
            }
            for description in &f.descriptions {
                part.push_str(", ");
                part.push_str(description);
            }
            part
        })
        .collect();

    join_non_empty(&parts, " + ")
}

/// Discogs disambiguates homonyms as "Name (2)"; drop the suffix.
fn clean_artist_name(name: &str) -> String {
    let trimmed = name.trim();
    if let Some(open) = trimmed.rfind(" (")
        && trimmed.ends_with(')')
        && trimmed[open + 2..trimmed.len() - 1]
            .chars()
            .all(|c| c.is_ascii_digit())
        && open + 3 < trimmed.len()
    {
        return trimmed[..open].to_string();
    }
    trimmed.to_string()
}

/// "1992-00-00" -> "1992", "1992-11-00" -> "1992-11".
fn trim_unknown_date_parts(date: &str) -> String {
    let mut parts: Vec<&str> = date.split('-').collect();
    while parts.len() > 1 && parts.last().is_some_and(|p| p.chars().all(|c| c == '0')) {
        parts.pop();
    }
    parts.join("-")
}

fn site_url(uri: &str) -> String {
    if uri.starts_with('/') {
        format!("{}{}", SITE_URL, uri)
    } else {
        uri.to_string()
    }
}

fn join_non_empty(parts: &[String], separator: &str) -> Option<String> {
    let parts: Vec<&str> = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TrackPosition, UNTITLED_TRACK};

    fn credit(name: &str, join: Option<&str>) -> dto::ArtistCredit {
        dto::ArtistCredit {
            name: name.to_string(),
            anv: None,
            join: join.map(String::from),
            role: None,
        }
    }

    fn release_json(extra: &str) -> dto::ReleaseResponse {
        let json = format!(r#"{{"id": 76823 {}}}"#, extra);
        serde_json::from_str(&json).expect("valid release json")
    }

    #[test]
    fn test_release_tracks_default_position_and_title() {
        let response = release_json(
            r#", "title": "SAW", "tracklist": [{"title": "Track A"}, {"position": "2", "title": "Track B"}, {"position": "3"}]"#,
        );

        let release = to_release(response);

        assert_eq!(release.tracks.len(), 3);
        assert_eq!(release.tracks[0].position, TrackPosition::Index(0));
        assert_eq!(release.tracks[0].title, "Track A");
        assert_eq!(release.tracks[1].position, TrackPosition::Label("2".to_string()));
        assert_eq!(release.tracks[1].title, "Track B");
        assert_eq!(release.tracks[2].title, UNTITLED_TRACK);
    }

    #[test]
    fn test_sparse_release_has_required_fields() {
        let release = to_release(release_json(""));

        assert_eq!(release.title, "");
        assert_eq!(release.artist, "");
        assert!(release.tracks.is_empty());
    }

    #[test]
    fn test_headings_skipped_and_index_follows_tracks() {
        let response = release_json(
            r#", "tracklist": [
                {"position": "", "type_": "heading", "title": "Part One"},
                {"position": "", "type_": "track", "title": "Intro"},
                {"position": "2", "type_": "track", "title": "Song"}
            ]"#,
        );

        let tracks = to_release(response).tracks;

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "Intro");
        assert_eq!(tracks[0].position, TrackPosition::Index(0));
    }

    #[test]
    fn test_categories_styles_then_genres() {
        let response = release_json(
            r#", "genres": ["Electronic"], "styles": ["Ambient", "IDM", "Electronic"]"#,
        );

        let release = to_release(response);

        assert_eq!(release.categories, vec!["Ambient", "IDM", "Electronic"]);
    }

    #[test]
    fn test_primary_image_index() {
        let response = release_json(
            r#", "images": [
                {"type": "secondary", "uri": "https://img/back.jpg"},
                {"type": "primary", "uri": "https://img/front.jpg"}
            ]"#,
        );

        let images = to_release(response).images;

        assert_eq!(images.primary_index, 1);
        assert_eq!(images.primary_url(), Some("https://img/front.jpg"));
    }

    #[test]
    fn test_primary_image_after_image_without_uri() {
        let response = release_json(
            r#", "images": [
                {"type": "secondary"},
                {"type": "secondary", "uri": "https://img/back.jpg"},
                {"type": "primary", "uri": "https://img/front.jpg"}
            ]"#,
        );

        let images = to_release(response).images;

        assert_eq!(images.urls.len(), 2);
        assert_eq!(images.primary_url(), Some("https://img/front.jpg"));
    }

    #[test]
    fn test_release_labels_credits_and_format() {
        let response = release_json(
            r#", "labels": [{"name": "Apollo (3)", "catno": "AMB 3922"}],
               "formats": [{"name": "Vinyl", "qty": "2", "descriptions": ["LP", "Album"]}],
               "extraartists": [{"name": "Richard D. James", "role": "Written-By"}, {"name": "Tom Coyne", "role": ""}],
               "released": "1992-00-00""#,
        );

        let release = to_release(response);

        assert_eq!(release.label.as_deref(), Some("Apollo"));
        assert_eq!(release.catalog_number.as_deref(), Some("AMB 3922"));
        assert_eq!(release.format.as_deref(), Some("2 x Vinyl, LP, Album"));
        assert_eq!(
            release.credits.as_deref(),
            Some("Written-By - Richard D. James\nTom Coyne")
        );
        assert_eq!(release.release_date.as_deref(), Some("1992"));
    }

    #[test]
    fn test_build_artist_string_joins() {
        let credits = vec![
            credit("Autechre", Some("&")),
            credit("The Hafler Trio (2)", Some(",")),
            credit("Richard H. Kirk", None),
        ];

        assert_eq!(
            build_artist_string(&credits).as_deref(),
            Some("Autechre & The Hafler Trio, Richard H. Kirk")
        );
        assert_eq!(build_artist_string(&[]), None);
    }

    #[test]
    fn test_artist_name_variation_preferred() {
        let mut c = credit("Aphex Twin", None);
        c.anv = Some("AFX".to_string());

        assert_eq!(build_artist_string(&[c]).as_deref(), Some("AFX"));
    }

    #[test]
    fn test_clean_artist_name_only_strips_numeric_suffix() {
        assert_eq!(clean_artist_name("Nirvana (2)"), "Nirvana");
        assert_eq!(clean_artist_name("Sunn O)))"), "Sunn O)))");
        assert_eq!(clean_artist_name("Band (UK)"), "Band (UK)");
        assert_eq!(clean_artist_name("()"), "()");
    }

    #[test]
    fn test_search_page_previews_and_skip() {
        let response: dto::SearchResponse = serde_json::from_str(
            r#"{
                "pagination": {"page": 2, "pages": 3, "per_page": 3, "items": 9},
                "results": [
                    {"id": 1, "type": "release", "title": "A - One"},
                    {"id": 2, "type": "release", "title": "B (2) - Two", "format": ["CD", "Album"], "label": ["Warp"], "catno": "WARP 1", "uri": "/release/2"},
                    {"id": 3, "type": "release", "title": "C - Three"}
                ]
            }"#,
        )
        .unwrap();

        let page = to_search_page(response, PageCursor::new(3, 4), true);

        assert_eq!(page.total_results, 9);
        assert_eq!(page.results.len(), 2);
        let row = &page.results[0];
        assert_eq!(row.id, "2");
        assert_eq!(row.title, "Two");
        assert_eq!(row.release_artist.as_deref(), Some("B"));
        assert_eq!(row.release_format.as_deref(), Some("CD, Album"));
        assert_eq!(row.release_label.as_deref(), Some("Warp"));
        assert_eq!(row.release_catalog_number.as_deref(), Some("WARP 1"));
        assert_eq!(
            row.provider_url.as_deref(),
            Some("https://www.discogs.com/release/2")
        );
    }

    #[test]
    fn test_search_page_without_previews_keeps_title() {
        let response: dto::SearchResponse = serde_json::from_str(
            r#"{"pagination": {"page": 1, "pages": 1, "per_page": 10, "items": 1},
                "results": [{"id": 45, "type": "artist", "title": "Aphex Twin"}]}"#,
        )
        .unwrap();

        let page = to_search_page(response, PageCursor::new(10, 0), false);

        assert_eq!(page.results[0].id, "45");
        assert_eq!(page.results[0].title, "Aphex Twin");
        assert!(page.results[0].release_artist.is_none());
    }

    #[test]
    fn test_children_masters_point_at_main_release() {
        let response: dto::ReleasesResponse = serde_json::from_str(
            r#"{"pagination": {"page": 1, "pages": 1, "per_page": 10, "items": 2},
                "releases": [
                    {"id": 565, "type": "master", "main_release": 76823, "title": "SAW 85-92", "year": 1992, "thumb": ""},
                    {"id": 99, "type": "release", "title": "Untitled"}
                ]}"#,
        )
        .unwrap();

        let page = to_children_page(response, None, PageCursor::new(10, 0));

        assert_eq!(page.page.results[0].id, "76823");
        assert_eq!(page.page.results[0].title, "SAW 85-92 (1992)");
        assert!(page.page.results[0].thumbnail_url.is_none());
        assert_eq!(page.page.results[1].id, "99");
    }

    #[test]
    fn test_parent_info_prefers_primary_image() {
        let profile: dto::Profile = serde_json::from_str(
            r#"{"id": 45, "name": "Aphex Twin", "profile": "", "uri": "https://www.discogs.com/artist/45",
                "images": [{"type": "secondary", "uri": "b.jpg"}, {"type": "primary", "uri": "a.jpg"}]}"#,
        )
        .unwrap();

        let info = to_parent_info(profile);

        assert_eq!(info.name.as_deref(), Some("Aphex Twin"));
        assert!(info.description.is_none());
        assert_eq!(info.image_url.as_deref(), Some("a.jpg"));
    }
}
