//! Release preview and import commands.

use std::fmt::Write as _;

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::mediator::ImportState;
use crate::model::{ReleaseRecord, TrackListing};
use crate::registry::AdapterRegistry;

/// Tracks shown by a teaser listing
const TEASER_TRACKS: usize = 3;

/// Fetch and print a release
pub fn cmd_show(
    rt: &Runtime,
    config: &Config,
    id: &str,
    teaser: bool,
    json: bool,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let registry = AdapterRegistry::from_config(config).await?;
        let mediator = registry.select(&config.selection())?;

        let release = mediator.view_release(id).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&release)?);
        } else {
            print!("{}", format_release(&release, teaser));
        }
        Ok(())
    })
}

/// Import releases one after another
pub fn cmd_import(rt: &Runtime, config: &Config, ids: &[String]) -> anyhow::Result<()> {
    rt.block_on(async {
        let registry = AdapterRegistry::from_config(config).await?;
        let mediator = registry.mediator(&config.selection(), config)?;

        let mut failed = 0;
        for id in ids {
            let report = mediator.import_release(id).await;

            match &report.state {
                ImportState::Done { result, warnings } => {
                    println!("✓ {}: {}", id, result.message);
                    if let Some(saved_id) = &result.id {
                        println!("  Stored as #{}", saved_id);
                    }
                    for warning in warnings {
                        println!("  ! {}", warning);
                    }
                }
                ImportState::Failed {
                    stage,
                    reason,
                    warnings,
                    ..
                } => {
                    failed += 1;
                    eprintln!("✗ {}: {} failed: {}", id, stage, reason);
                    for warning in warnings {
                        eprintln!("  ! {}", warning);
                    }
                }
                other => {
                    failed += 1;
                    eprintln!("✗ {}: import stopped in {}", id, other.name());
                }
            }
        }

        if failed > 0 {
            anyhow::bail!("{} of {} imports failed", failed, ids.len());
        }
        Ok(())
    })
}

fn format_release(release: &ReleaseRecord, teaser: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} - {}", release.artist, release.title);
    let fields = [
        ("Label", &release.label),
        ("Cat#", &release.catalog_number),
        ("Format", &release.format),
        ("Country", &release.country),
        ("Released", &release.release_date),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<9} {}", format!("{}:", name), value);
        }
    }
    if !release.categories.is_empty() {
        let _ = writeln!(out, "  {:<9} {}", "Genres:", release.categories.join(", "));
    }
    if let Some(url) = release.images.primary_url() {
        let _ = writeln!(out, "  {:<9} {}", "Image:", url);
    }

    let _ = writeln!(out);
    out.push_str(&format_track_listing(&release.track_listing(teaser, !teaser)));

    if !teaser {
        if let Some(credits) = &release.credits {
            let _ = writeln!(out, "\nCredits:\n{}", credits);
        }
        if let Some(notes) = &release.notes {
            let _ = writeln!(out, "\nNotes:\n{}", notes);
        }
    }

    out
}

/// Plain-text rendering of a track listing.
///
/// Teasers show the first few titles only; full pages add durations,
/// track artists and notes.
pub(crate) fn format_track_listing(listing: &TrackListing<'_>) -> String {
    let mut out = String::new();

    if listing.tracks.is_empty() {
        out.push_str("No tracks.\n");
        return out;
    }

    let shown = if listing.teaser {
        TEASER_TRACKS.min(listing.tracks.len())
    } else {
        listing.tracks.len()
    };

    for track in &listing.tracks[..shown] {
        let _ = write!(out, "{:>5}  {}", track.position.to_string(), track.title);
        if listing.page {
            if let Some(artist) = &track.artist {
                let _ = write!(out, " ({})", artist);
            }
            if let Some(duration) = &track.duration {
                let _ = write!(out, "  {}", duration);
            }
        }
        out.push('\n');
        if listing.page
            && let Some(notes) = &track.notes
        {
            let _ = writeln!(out, "       {}", notes);
        }
    }

    if shown < listing.tracks.len() {
        let _ = writeln!(out, "       ... and {} more", listing.tracks.len() - shown);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TrackPosition, TrackRecord};
    use crate::test_utils::sample_release;

    #[test]
    fn test_teaser_listing_truncates() {
        let release = sample_release(5);
        let text = format_track_listing(&release.track_listing(true, false));

        assert_eq!(
            text,
            "    1  Track 1\n    2  Track 2\n    3  Track 3\n       ... and 2 more\n"
        );
    }

    #[test]
    fn test_page_listing_includes_details() {
        let mut track = TrackRecord::new(TrackPosition::Label("A1".to_string()), "Xtal");
        track.duration = Some("4:51".to_string());
        track.notes = Some("Remastered".to_string());
        let tracks = vec![track, TrackRecord::new(TrackPosition::Index(1), "Tha")];
        let listing = TrackListing {
            tracks: &tracks,
            teaser: false,
            page: true,
        };

        assert_eq!(
            format_track_listing(&listing),
            "   A1  Xtal  4:51\n       Remastered\n    1  Tha\n"
        );
    }

    #[test]
    fn test_empty_listing() {
        let release = sample_release(0);
        assert_eq!(
            format_track_listing(&release.track_listing(false, true)),
            "No tracks.\n"
        );
    }

    #[test]
    fn test_format_release_header() {
        let mut release = sample_release(1);
        release.categories = vec!["Ambient".to_string(), "Techno".to_string()];
        let text = format_release(&release, true);

        assert!(text.starts_with("Aphex Twin - Selected Ambient Works 85-92\n"));
        assert!(text.contains("  Label:    Apollo\n"));
        assert!(text.contains("  Genres:   Ambient, Techno\n"));
    }
}
