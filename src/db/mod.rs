//! Database module for imported release persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Provides async operations for:
//! - Release, track, term link and asset inserts (inside a caller's transaction)
//! - Taxonomy term lookup and creation
//! - Reading imported releases back
//!
//! # Example
//!
//! ```ignore
//! use discog_mediator::db::{init_db, get_release};
//!
//! let pool = init_db("sqlite:discog_mediator.db").await?;
//! let release = get_release(&pool, 1).await?;
//! ```

use sqlx::SqliteConnection;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::model::{ReleaseRecord, TrackPosition, TrackRecord};
use crate::resolve::AssetRef;

const POSITION_INDEX: &str = "index";
const POSITION_LABEL: &str = "label";

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "discog_mediator.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

// ============================================================================
// Terms
// ============================================================================

/// Find a term by exact name within a vocabulary.
pub async fn find_term(
    pool: &SqlitePool,
    vocabulary: &str,
    name: &str,
) -> sqlx::Result<Option<i64>> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM terms WHERE vocabulary = ? AND name = ?")
            .bind(vocabulary)
            .bind(name)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(id,)| id))
}

/// Create a term, returning its ID.
///
/// The `(vocabulary, name)` uniqueness constraint makes this safe against
/// concurrent creators: a second insert of the same name is a no-op and
/// both callers get the same ID.
pub async fn create_term(pool: &SqlitePool, vocabulary: &str, name: &str) -> sqlx::Result<i64> {
    sqlx::query("INSERT INTO terms (vocabulary, name) VALUES (?, ?) ON CONFLICT (vocabulary, name) DO NOTHING")
        .bind(vocabulary)
        .bind(name)
        .execute(pool)
        .await?;

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM terms WHERE vocabulary = ? AND name = ?")
        .bind(vocabulary)
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

/// Count terms in a vocabulary.
pub async fn count_terms(pool: &SqlitePool, vocabulary: &str) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM terms WHERE vocabulary = ?")
        .bind(vocabulary)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// ============================================================================
// Release inserts (transaction-scoped)
// ============================================================================

/// Insert the release row, returning its ID.
pub async fn insert_release(
    conn: &mut SqliteConnection,
    release: &ReleaseRecord,
    imported_at: &str,
) -> sqlx::Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO releases
            (title, artist, label, catalog_number, format, country,
             release_date, credits, notes, imported_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&release.title)
    .bind(&release.artist)
    .bind(&release.label)
    .bind(&release.catalog_number)
    .bind(&release.format)
    .bind(&release.country)
    .bind(&release.release_date)
    .bind(&release.credits)
    .bind(&release.notes)
    .bind(imported_at)
    .execute(conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Insert one track at `delta` (its zero-based order within the release).
pub async fn insert_track(
    conn: &mut SqliteConnection,
    release_id: i64,
    delta: usize,
    track: &TrackRecord,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO release_tracks
            (release_id, delta, position, position_kind, title, duration, artist, notes, lyrics)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(release_id)
    .bind(delta as i64)
    .bind(track.position.to_string())
    .bind(position_kind(&track.position))
    .bind(&track.title)
    .bind(&track.duration)
    .bind(&track.artist)
    .bind(&track.notes)
    .bind(&track.lyrics)
    .execute(conn)
    .await?;

    Ok(())
}

fn position_kind(position: &TrackPosition) -> &'static str {
    match position {
        TrackPosition::Index(_) => POSITION_INDEX,
        TrackPosition::Label(_) => POSITION_LABEL,
    }
}

/// Link a term to a release at `delta`.
pub async fn link_term(
    conn: &mut SqliteConnection,
    release_id: i64,
    term_id: i64,
    delta: usize,
) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO release_terms (release_id, term_id, delta) VALUES (?, ?, ?)")
        .bind(release_id)
        .bind(term_id)
        .bind(delta as i64)
        .execute(conn)
        .await?;
    Ok(())
}

/// Record the image asset of a release.
pub async fn insert_asset(
    conn: &mut SqliteConnection,
    release_id: i64,
    asset: &AssetRef,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO assets
            (release_id, uri, file_name, mime_type, sha256, size_bytes, source_url)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(release_id)
    .bind(&asset.uri)
    .bind(&asset.file_name)
    .bind(&asset.mime_type)
    .bind(&asset.sha256)
    .bind(asset.size_bytes as i64)
    .bind(&asset.source_url)
    .execute(conn)
    .await?;
    Ok(())
}

// ============================================================================
// Reads
// ============================================================================

/// An imported release row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredRelease {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub label: Option<String>,
    pub catalog_number: Option<String>,
    pub format: Option<String>,
    pub country: Option<String>,
    pub release_date: Option<String>,
    pub credits: Option<String>,
    pub notes: Option<String>,
    pub imported_at: String,
}

/// An imported track row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredTrack {
    pub delta: i64,
    pub position: String,
    pub position_kind: String,
    pub title: String,
    pub duration: Option<String>,
    pub artist: Option<String>,
    pub notes: Option<String>,
    pub lyrics: Option<String>,
}

impl StoredTrack {
    /// The position as it was before storage.
    ///
    /// An assigned index that no longer parses is returned as a label.
    pub fn track_position(&self) -> TrackPosition {
        if self.position_kind == POSITION_INDEX
            && let Ok(index) = self.position.parse()
        {
            return TrackPosition::Index(index);
        }
        TrackPosition::Label(self.position.clone())
    }
}

/// Get a release by ID.
pub async fn get_release(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<StoredRelease>> {
    sqlx::query_as::<_, StoredRelease>(
        r#"
        SELECT id, title, artist, label, catalog_number, format, country,
               release_date, credits, notes, imported_at
        FROM releases WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Get a release's tracks in stored order.
pub async fn get_release_tracks(pool: &SqlitePool, release_id: i64) -> sqlx::Result<Vec<StoredTrack>> {
    sqlx::query_as::<_, StoredTrack>(
        r#"
        SELECT delta, position, position_kind, title, duration, artist, notes, lyrics
        FROM release_tracks WHERE release_id = ? ORDER BY delta
        "#,
    )
    .bind(release_id)
    .fetch_all(pool)
    .await
}

/// Get the names of a release's linked terms in stored order.
pub async fn get_release_terms(pool: &SqlitePool, release_id: i64) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT t.name FROM release_terms rt
        JOIN terms t ON rt.term_id = t.id
        WHERE rt.release_id = ? ORDER BY rt.delta
        "#,
    )
    .bind(release_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Get the asset URIs recorded for a release.
pub async fn get_release_assets(pool: &SqlitePool, release_id: i64) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT uri FROM assets WHERE release_id = ? ORDER BY id")
            .bind(release_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(uri,)| uri).collect())
}

/// Count imported releases.
pub async fn count_releases(pool: &SqlitePool) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM releases")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
