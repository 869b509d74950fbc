//! Test utilities and fixtures for discog-mediator tests.
//!
//! This module provides a temporary database, in-memory stand-ins for every
//! adapter and resolver seam, and sample records.
//!
//! # Example
//!
//! ```ignore
//! use discog_mediator::test_utils::{MockEntity, MockProvider, sample_release};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let provider = MockProvider::default().with_release("r1", sample_release(3));
//!     let entity = Arc::new(MockEntity::default());
//!     // ... test logic
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::entity::{EntityAdapter, PreparedRelease};
use crate::model::{
    ChildrenPage, EntityTypeInfo, ProviderInfo, ReleaseRecord, SaveResult, SearchResultPage,
    TrackPosition, TrackRecord,
};
use crate::provider::{PageCursor, ProviderAdapter, ProviderError, SearchQuery};
use crate::resolve::{
    AssetRef, AssetStore, FetchedImage, ImageFetcher, ResolveError, TaxonomyStore, TermRef,
};

/// Creates a temporary database for testing.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically.
///
/// Keep the TempDir alive for the duration of your test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// A release with `tracks` numbered tracks.
pub fn sample_release(tracks: usize) -> ReleaseRecord {
    ReleaseRecord {
        title: "Selected Ambient Works 85-92".to_string(),
        artist: "Aphex Twin".to_string(),
        label: Some("Apollo".to_string()),
        tracks: (0..tracks)
            .map(|i| TrackRecord::new(TrackPosition::Label(format!("{}", i + 1)), format!("Track {}", i + 1)))
            .collect(),
        ..Default::default()
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Provider with canned responses.
///
/// Search types: `release` (returns releases; filters `all`, `album`),
/// `artist` and `label` (no filters).
#[derive(Default)]
pub struct MockProvider {
    searches: HashMap<String, SearchResultPage>,
    children: HashMap<String, ChildrenPage>,
    releases: HashMap<String, ReleaseRecord>,
    error: Option<ProviderError>,
    calls: Arc<Mutex<Vec<String>>>,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
}

impl MockProvider {
    pub fn with_search(mut self, search_type: &str, page: SearchResultPage) -> Self {
        self.searches.insert(search_type.to_string(), page);
        self
    }

    pub fn with_children(mut self, parent_id: &str, page: ChildrenPage) -> Self {
        self.children.insert(parent_id.to_string(), page);
        self
    }

    pub fn with_release(mut self, id: &str, release: ReleaseRecord) -> Self {
        self.releases.insert(id.to_string(), release);
        self
    }

    /// Every call fails with `error`.
    pub fn failing_with(mut self, error: ProviderError) -> Self {
        self.error = Some(error);
        self
    }

    /// Names of the adapter calls made so far.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }

    /// Search queries as received by the adapter.
    pub fn queries(&self) -> Arc<Mutex<Vec<SearchQuery>>> {
        self.queries.clone()
    }

    fn record(&self, call: String) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(call);
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn describe_provider(&self) -> ProviderInfo {
        let pairs = |items: &[(&str, &str)]| -> BTreeMap<String, String> {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        ProviderInfo {
            name: "Mock".to_string(),
            description: "Canned responses".to_string(),
            search_types: pairs(&[("release", "Releases"), ("artist", "Artists"), ("label", "Labels")]),
            returns_releases: BTreeSet::from(["release".to_string()]),
            search_filters: BTreeMap::from([(
                "release".to_string(),
                pairs(&[("all", "All"), ("album", "Albums")]),
            )]),
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage, ProviderError> {
        self.record(format!("search:{}", query.search_type))?;
        self.queries.lock().unwrap().push(query.clone());
        Ok(self
            .searches
            .get(&query.search_type)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_children(
        &self,
        search_type: &str,
        id: &str,
        _cursor: PageCursor,
    ) -> Result<ChildrenPage, ProviderError> {
        self.record(format!("children:{}:{}", search_type, id))?;
        Ok(self.children.get(id).cloned().unwrap_or_default())
    }

    async fn fetch_release(&self, id: &str) -> Result<ReleaseRecord, ProviderError> {
        self.record(format!("release:{}", id))?;
        self.releases
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }
}

// ============================================================================
// Entity
// ============================================================================

/// Entity adapter that keeps every release it is asked to save.
#[derive(Default)]
pub struct MockEntity {
    saved: Mutex<Vec<PreparedRelease>>,
    failure: Option<String>,
}

impl MockEntity {
    /// Every save fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn saved(&self) -> Vec<PreparedRelease> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntityAdapter for MockEntity {
    fn describe_type(&self) -> EntityTypeInfo {
        EntityTypeInfo {
            name: "Mock release".to_string(),
            description: "In-memory".to_string(),
        }
    }

    async fn save_release(&self, release: &PreparedRelease) -> SaveResult {
        if let Some(message) = &self.failure {
            return SaveResult::failed(message.clone());
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(release.clone());
        SaveResult::saved(saved.len().to_string(), "saved")
    }
}

// ============================================================================
// Resolver seams
// ============================================================================

/// In-memory taxonomy.
#[derive(Default)]
pub struct MemoryTaxonomy {
    terms: Mutex<Vec<(String, TermRef)>>,
    failing: Option<String>,
}

impl MemoryTaxonomy {
    /// Creating a term called `name` fails.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing = Some(name.to_string());
        self
    }

    pub fn created_count(&self) -> usize {
        self.terms.lock().unwrap().len()
    }
}

#[async_trait]
impl TaxonomyStore for MemoryTaxonomy {
    async fn find_term(
        &self,
        vocabulary: &str,
        name: &str,
    ) -> Result<Option<TermRef>, ResolveError> {
        Ok(self
            .terms
            .lock()
            .unwrap()
            .iter()
            .find(|(vocab, term)| vocab == vocabulary && term.name == name)
            .map(|(_, term)| term.clone()))
    }

    async fn create_term(&self, vocabulary: &str, name: &str) -> Result<TermRef, ResolveError> {
        if self.failing.as_deref() == Some(name) {
            return Err(ResolveError::Storage(format!("cannot create '{}'", name)));
        }
        let mut terms = self.terms.lock().unwrap();
        let term = TermRef {
            id: (terms.len() + 1).to_string(),
            name: name.to_string(),
        };
        terms.push((vocabulary.to_string(), term.clone()));
        Ok(term)
    }
}

/// Fetcher returning the same bytes for every URL, or always failing.
pub struct StaticFetcher {
    data: Option<Vec<u8>>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn ok(data: &[u8]) -> Self {
        Self {
            data: Some(data.to_vec()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            data: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ResolveError> {
        self.requested.lock().unwrap().push(url.to_string());
        match &self.data {
            Some(data) => Ok(FetchedImage {
                data: data.clone(),
                mime_type: "image/jpeg".to_string(),
                url: url.to_string(),
            }),
            None => Err(ResolveError::Network("connection refused".to_string())),
        }
    }
}

/// Asset store keeping names only.
#[derive(Default)]
pub struct MemoryAssets {
    stored: Mutex<Vec<String>>,
}

impl MemoryAssets {
    pub fn stored_names(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for MemoryAssets {
    async fn store(&self, file_name: &str, image: &FetchedImage) -> Result<AssetRef, ResolveError> {
        self.stored.lock().unwrap().push(file_name.to_string());
        Ok(AssetRef {
            uri: format!("memory://{}", file_name),
            file_name: file_name.to_string(),
            mime_type: image.mime_type.clone(),
            sha256: String::new(),
            size_bytes: image.data.len() as u64,
            source_url: image.url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        let count = crate::db::count_releases(&pool).await.unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_sample_release() {
        let release = sample_release(3);
        assert_eq!(release.tracks.len(), 3);
        assert_eq!(release.tracks[2].title, "Track 3");
        assert_eq!(release.tracks[0].position, TrackPosition::Label("1".to_string()));
    }

    #[tokio::test]
    async fn test_mock_provider_records_calls() {
        let provider = MockProvider::default().with_release("r1", sample_release(1));

        provider.fetch_release("r1").await.unwrap();
        assert!(provider.fetch_release("r2").await.is_err());

        assert_eq!(
            *provider.calls().lock().unwrap(),
            vec!["release:r1".to_string(), "release:r2".to_string()]
        );
    }
}
