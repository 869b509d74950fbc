//! SQLite entity adapter.
//!
//! Each save runs in one transaction: the release row, its tracks in order,
//! term links and the image asset either all land or none do. The same
//! store backs category resolution as a [`TaxonomyStore`].

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use super::{EntityAdapter, PreparedRelease};
use crate::db;
use crate::model::{EntityTypeInfo, SaveResult};
use crate::resolve::{ResolveError, TaxonomyStore, TermRef};

/// Registry id of this entity adapter
pub const ENTITY_ID: &str = "sqlite";

/// Releases stored in a local SQLite database.
#[derive(Clone)]
pub struct SqliteReleaseStore {
    pool: SqlitePool,
}

impl SqliteReleaseStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating and migrating if needed) the database at `db_url`.
    pub async fn open(db_url: &str) -> Result<Self, sqlx::Error> {
        Ok(Self::new(db::init_db(db_url).await?))
    }

    async fn write(&self, release: &PreparedRelease) -> Result<i64, sqlx::Error> {
        let imported_at = chrono::Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let id = db::insert_release(&mut tx, &release.record, &imported_at).await?;

        for (delta, track) in release.record.tracks.iter().enumerate() {
            db::insert_track(&mut tx, id, delta, track).await?;
        }

        let mut delta = 0;
        for term in &release.terms {
            let Ok(term_id) = term.id.parse::<i64>() else {
                tracing::warn!("Skipping term '{}' with foreign id '{}'", term.name, term.id);
                continue;
            };
            db::link_term(&mut tx, id, term_id, delta).await?;
            delta += 1;
        }

        if let Some(asset) = &release.image {
            db::insert_asset(&mut tx, id, asset).await?;
        }

        tx.commit().await?;
        Ok(id)
    }
}

#[async_trait]
impl EntityAdapter for SqliteReleaseStore {
    fn describe_type(&self) -> EntityTypeInfo {
        EntityTypeInfo {
            name: "SQLite release".to_string(),
            description: "Stores releases, tracks, categories and cover images in a local SQLite database"
                .to_string(),
        }
    }

    async fn save_release(&self, release: &PreparedRelease) -> SaveResult {
        let title = &release.record.title;

        match self.write(release).await {
            Ok(id) => {
                tracing::info!(
                    "Saved release '{}' as #{} ({} tracks)",
                    title,
                    id,
                    release.record.tracks.len()
                );
                SaveResult::saved(
                    id.to_string(),
                    format!(
                        "Saved '{}' with {} tracks",
                        title,
                        release.record.tracks.len()
                    ),
                )
            }
            Err(e) => {
                tracing::error!("Failed to save release '{}': {}", title, e);
                SaveResult::failed(format!("Failed to save '{}': {}", title, e))
            }
        }
    }
}

#[async_trait]
impl TaxonomyStore for SqliteReleaseStore {
    async fn find_term(
        &self,
        vocabulary: &str,
        name: &str,
    ) -> Result<Option<TermRef>, ResolveError> {
        let id = db::find_term(&self.pool, vocabulary, name)
            .await
            .map_err(|e| ResolveError::Storage(e.to_string()))?;

        Ok(id.map(|id| TermRef {
            id: id.to_string(),
            name: name.to_string(),
        }))
    }

    async fn create_term(&self, vocabulary: &str, name: &str) -> Result<TermRef, ResolveError> {
        let id = db::create_term(&self.pool, vocabulary, name)
            .await
            .map_err(|e| ResolveError::Storage(e.to_string()))?;

        Ok(TermRef {
            id: id.to_string(),
            name: name.to_string(),
        })
    }
}
