//! Imported release listing and config commands.

use std::fmt::Write as _;
use std::path::Path;

use tokio::runtime::Runtime;

use super::import::format_track_listing;
use crate::config::{self, Config};
use crate::db::{self, StoredRelease, StoredTrack};
use crate::model::{TrackListing, TrackRecord};

/// Show database totals, or one imported release
pub fn cmd_library(rt: &Runtime, config: &Config, id: Option<i64>) -> anyhow::Result<()> {
    rt.block_on(async {
        let url = db::db_url(config.storage.database.as_deref());
        let pool = db::init_db(&url).await?;

        let Some(id) = id else {
            let releases = db::count_releases(&pool).await?;
            let terms = db::count_terms(&pool, &config.categories.vocabulary).await?;
            println!("Database: {}", url);
            println!("  Releases: {}", releases);
            println!("  Terms in '{}': {}", config.categories.vocabulary, terms);
            return Ok(());
        };

        let Some(release) = db::get_release(&pool, id).await? else {
            anyhow::bail!("No imported release #{}", id);
        };
        let tracks = db::get_release_tracks(&pool, id).await?;
        let terms = db::get_release_terms(&pool, id).await?;
        let assets = db::get_release_assets(&pool, id).await?;

        print!("{}", format_stored(&release, &tracks, &terms, &assets));
        Ok(())
    })
}

/// Print the effective config, optionally writing it to disk
pub fn cmd_config(config: &Config, write: bool, path: Option<&Path>) -> anyhow::Result<()> {
    if !write {
        print!("{}", toml::to_string_pretty(config)?);
        return Ok(());
    }

    match path {
        Some(path) => {
            config::save_to(config, path)?;
            println!("✓ Wrote {}", path.display());
        }
        None => {
            config::save(config)?;
            if let Some(path) = config::config_path() {
                println!("✓ Wrote {}", path.display());
            }
        }
    }
    Ok(())
}

fn format_stored(
    release: &StoredRelease,
    tracks: &[StoredTrack],
    terms: &[String],
    assets: &[String],
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "#{} {} - {}", release.id, release.artist, release.title);
    let fields = [
        ("Label", &release.label),
        ("Cat#", &release.catalog_number),
        ("Format", &release.format),
        ("Released", &release.release_date),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<9} {}", format!("{}:", name), value);
        }
    }
    let _ = writeln!(out, "  {:<9} {}", "Imported:", release.imported_at);
    if !terms.is_empty() {
        let _ = writeln!(out, "  {:<9} {}", "Terms:", terms.join(", "));
    }
    for asset in assets {
        let _ = writeln!(out, "  {:<9} {}", "Image:", asset);
    }

    let records: Vec<TrackRecord> = tracks
        .iter()
        .map(|t| TrackRecord {
            position: t.track_position(),
            title: t.title.clone(),
            duration: t.duration.clone(),
            artist: t.artist.clone(),
            notes: t.notes.clone(),
            lyrics: t.lyrics.clone(),
        })
        .collect();

    let _ = writeln!(out);
    out.push_str(&format_track_listing(&TrackListing {
        tracks: &records,
        teaser: false,
        page: true,
    }));
    out
}
