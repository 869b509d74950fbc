//! Adapter registry.
//!
//! Provider and entity adapters are registered under string ids at startup.
//! A [`Selection`] names one of each and is resolved once into a
//! [`Mediator`]; nothing is looked up by name after that.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::db;
use crate::entity::{self, EntityAdapter, SqliteReleaseStore};
use crate::error::{Error, Result, ResultExt};
use crate::mediator::Mediator;
use crate::model::{EntityTypeInfo, ProviderInfo};
use crate::provider::discogs::{self, DiscogsClient};
use crate::provider::musicbrainz::{self, MusicBrainzClient};
use crate::provider::ProviderAdapter;
use crate::resolve::{
    CategoryResolver, FileAssetStore, HttpImageFetcher, ImageResolver, TaxonomyStore,
};

/// The provider/entity pair an import runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub provider: String,
    pub entity: String,
}

/// Adapters by id.
#[derive(Default)]
pub struct AdapterRegistry {
    providers: BTreeMap<String, Arc<dyn ProviderAdapter>>,
    entities: BTreeMap<String, Arc<dyn EntityAdapter>>,
    /// Taxonomy backing category resolution, keyed by entity id
    taxonomies: BTreeMap<String, Arc<dyn TaxonomyStore>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in adapters, configured from `config`.
    ///
    /// Opens (and migrates) the SQLite database.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();

        registry.register_provider(
            discogs::PROVIDER_ID,
            Arc::new(DiscogsClient::new(config.credentials.discogs_token.clone())?),
        );
        registry.register_provider(
            musicbrainz::PROVIDER_ID,
            Arc::new(
                MusicBrainzClient::new()?.with_cover_size(config.import.musicbrainz_cover_size),
            ),
        );

        let url = db::db_url(config.storage.database.as_deref());
        let store = Arc::new(
            SqliteReleaseStore::open(&url)
                .await
                .with_context(format!("opening {}", url))?,
        );
        registry.register_entity(entity::ENTITY_ID, store.clone());
        registry.register_taxonomy(entity::ENTITY_ID, store);

        Ok(registry)
    }

    pub fn register_provider(&mut self, id: &str, adapter: Arc<dyn ProviderAdapter>) {
        tracing::debug!("Registered provider '{}'", id);
        self.providers.insert(id.to_string(), adapter);
    }

    pub fn register_entity(&mut self, id: &str, adapter: Arc<dyn EntityAdapter>) {
        tracing::debug!("Registered entity '{}'", id);
        self.entities.insert(id.to_string(), adapter);
    }

    /// Use `store` for category terms when importing into entity `entity_id`.
    pub fn register_taxonomy(&mut self, entity_id: &str, store: Arc<dyn TaxonomyStore>) {
        self.taxonomies.insert(entity_id.to_string(), store);
    }

    pub fn provider(&self, id: &str) -> Result<Arc<dyn ProviderAdapter>> {
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| Error::unknown_provider(id))
    }

    pub fn entity(&self, id: &str) -> Result<Arc<dyn EntityAdapter>> {
        self.entities
            .get(id)
            .cloned()
            .ok_or_else(|| Error::unknown_entity(id))
    }

    /// Provider ids with their descriptions, sorted by id.
    pub fn providers(&self) -> Vec<(String, ProviderInfo)> {
        self.providers
            .iter()
            .map(|(id, adapter)| (id.clone(), adapter.describe_provider()))
            .collect()
    }

    /// Entity ids with their descriptions, sorted by id.
    pub fn entities(&self) -> Vec<(String, EntityTypeInfo)> {
        self.entities
            .iter()
            .map(|(id, adapter)| (id.clone(), adapter.describe_type()))
            .collect()
    }

    /// Resolve a selection into a mediator without resolvers.
    pub fn select(&self, selection: &Selection) -> Result<Mediator> {
        let provider = self.provider(&selection.provider)?;
        let entity = self.entity(&selection.entity)?;
        tracing::info!(
            "Using provider '{}' and entity '{}'",
            selection.provider,
            selection.entity
        );
        Ok(Mediator::new(provider, entity))
    }

    /// Resolve a selection and attach the resolvers `config` enables.
    pub fn mediator(&self, selection: &Selection, config: &Config) -> Result<Mediator> {
        let mut mediator = self.select(selection)?;

        if config.categories.enabled {
            match self.taxonomies.get(&selection.entity) {
                Some(store) => {
                    mediator = mediator.with_categories(CategoryResolver::new(
                        store.clone(),
                        config.categories.vocabulary.clone(),
                    ));
                }
                None => tracing::warn!(
                    "Entity '{}' has no taxonomy; categories will not be resolved",
                    selection.entity
                ),
            }
        }

        if config.images.enabled {
            let assets = match &config.images.directory {
                Some(dir) => FileAssetStore::new(dir),
                None => FileAssetStore::default_location(),
            };
            tracing::debug!("Images stored in {:?}", assets.dir());
            mediator = mediator
                .with_images(ImageResolver::new(Arc::new(HttpImageFetcher::new()?), Arc::new(assets)));
        }

        Ok(mediator)
    }
}
