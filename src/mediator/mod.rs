//! Import orchestration.
//!
//! The [`Mediator`] drives one provider and one entity adapter through
//! search, optional child browsing, release fetch, side-effect resolution
//! and persistence:
//!
//! ```text
//! SEARCHING -> BROWSING_CHILDREN? -> VIEWING_RELEASE
//!           -> RESOLVING_SIDE_EFFECTS -> PERSISTING -> DONE | FAILED
//! ```
//!
//! The mediator holds no mutable state. Pagination cursors come in with
//! each call, so one mediator can serve any number of concurrent imports.
//! Nothing is retried here; callers re-issue a call after a retryable error.

mod state;

use std::sync::Arc;

pub use state::{ImportReport, ImportState, MediatorError, NextStep, SearchOutcome, Stage};

use crate::entity::{EntityAdapter, PreparedRelease};
use crate::model::{
    ChildrenPage, EntityTypeInfo, ProviderInfo, ReleaseRecord, SaveResult, SearchResult,
};
use crate::provider::{PageCursor, ProviderAdapter, SearchQuery};
use crate::resolve::{CategoryResolution, CategoryResolver, ImageResolution, ImageResolver};

/// Orchestrates an import between a provider and an entity adapter.
pub struct Mediator {
    provider: Arc<dyn ProviderAdapter>,
    entity: Arc<dyn EntityAdapter>,
    categories: Option<CategoryResolver>,
    images: Option<ImageResolver>,
    info: ProviderInfo,
}

impl Mediator {
    pub fn new(provider: Arc<dyn ProviderAdapter>, entity: Arc<dyn EntityAdapter>) -> Self {
        let info = provider.describe_provider();
        Self {
            provider,
            entity,
            categories: None,
            images: None,
            info,
        }
    }

    /// Resolve release categories into taxonomy terms before saving.
    pub fn with_categories(mut self, resolver: CategoryResolver) -> Self {
        self.categories = Some(resolver);
        self
    }

    /// Import the primary release image before saving.
    pub fn with_images(mut self, resolver: ImageResolver) -> Self {
        self.images = Some(resolver);
        self
    }

    pub fn provider_info(&self) -> &ProviderInfo {
        &self.info
    }

    pub fn entity_info(&self) -> EntityTypeInfo {
        self.entity.describe_type()
    }

    // ------------------------------------------------------------------
    // SEARCHING
    // ------------------------------------------------------------------

    /// Run a validated search.
    ///
    /// Filters are checked against the search type's own filter set. A
    /// filter on a type that defines none is dropped rather than passed on.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, MediatorError> {
        if !self.info.has_search_type(&query.search_type) {
            return Err(MediatorError::UnknownSearchType(query.search_type.clone()));
        }
        if query.cursor.per_page == 0 {
            return Err(MediatorError::InvalidPageSize);
        }

        let mut query = query.clone();
        if let Some(filter) = query.filter.take() {
            match self.info.filters_for(&query.search_type) {
                Some(filters) if filters.contains_key(&filter) => query.filter = Some(filter),
                Some(_) => {
                    return Err(MediatorError::UnknownFilter {
                        search_type: query.search_type,
                        filter,
                    });
                }
                None => tracing::debug!(
                    "Ignoring filter '{}': search type '{}' has no filters",
                    filter,
                    query.search_type
                ),
            }
        }

        tracing::info!(
            "Searching {} for {} '{}' (offset {})",
            self.info.name,
            query.search_type,
            query.term,
            query.cursor.offset
        );

        let page = self
            .provider
            .search(&query)
            .await
            .map_err(MediatorError::at(Stage::Searching))?
            .clamped(query.cursor.per_page);

        let next = if self.info.returns_releases(&query.search_type) {
            NextStep::ViewRelease
        } else {
            NextStep::BrowseChildren
        };

        Ok(SearchOutcome { page, next })
    }

    /// The state entered by selecting `result` from a page of `search_type`.
    pub fn choose(&self, search_type: &str, result: &SearchResult) -> ImportState {
        if self.info.returns_releases(search_type) {
            ImportState::ViewingRelease {
                release_id: result.id.clone(),
            }
        } else {
            ImportState::BrowsingChildren {
                search_type: search_type.to_string(),
                parent_id: result.id.clone(),
            }
        }
    }

    // ------------------------------------------------------------------
    // BROWSING_CHILDREN
    // ------------------------------------------------------------------

    /// List the releases under an intermediate entity (artist, label).
    pub async fn browse_children(
        &self,
        search_type: &str,
        parent_id: &str,
        cursor: PageCursor,
    ) -> Result<ChildrenPage, MediatorError> {
        if !self.info.has_search_type(search_type) {
            return Err(MediatorError::UnknownSearchType(search_type.to_string()));
        }
        if self.info.returns_releases(search_type) {
            return Err(MediatorError::NotBrowsable(search_type.to_string()));
        }
        if cursor.per_page == 0 {
            return Err(MediatorError::InvalidPageSize);
        }

        tracing::info!(
            "Browsing {} {} on {} (offset {})",
            search_type,
            parent_id,
            self.info.name,
            cursor.offset
        );

        let children = self
            .provider
            .fetch_children(search_type, parent_id, cursor)
            .await
            .map_err(MediatorError::at(Stage::BrowsingChildren))?;

        Ok(ChildrenPage {
            info: children.info,
            page: children.page.clamped(cursor.per_page),
        })
    }

    // ------------------------------------------------------------------
    // VIEWING_RELEASE -> RESOLVING_SIDE_EFFECTS -> PERSISTING
    // ------------------------------------------------------------------

    /// Fetch one release in canonical form.
    pub async fn view_release(&self, release_id: &str) -> Result<ReleaseRecord, MediatorError> {
        tracing::info!("Fetching release {} from {}", release_id, self.info.name);
        self.provider
            .fetch_release(release_id)
            .await
            .map_err(MediatorError::at(Stage::ViewingRelease))
    }

    /// Run the configured resolvers. Never fails; degradations are
    /// recorded on the returned release.
    ///
    /// Category and image resolution run concurrently and independently.
    pub async fn resolve_side_effects(&self, record: ReleaseRecord) -> PreparedRelease {
        let categories = async {
            match &self.categories {
                Some(resolver) => resolver.resolve(&record.categories).await,
                None => CategoryResolution::default(),
            }
        };
        let images = async {
            match &self.images {
                Some(resolver) => resolver.resolve(&record.images).await,
                None => ImageResolution::default(),
            }
        };

        let (categories, image) = tokio::join!(categories, images);

        let mut warnings = categories.warnings;
        warnings.extend(image.warning);

        PreparedRelease {
            terms: categories.terms,
            image: image.asset,
            warnings,
            record,
        }
    }

    /// Hand the release to the entity adapter; its result is returned as is.
    pub async fn persist(&self, release: &PreparedRelease) -> SaveResult {
        self.entity.save_release(release).await
    }

    // ------------------------------------------------------------------
    // Automatic transitions
    // ------------------------------------------------------------------

    /// Perform one automatic transition.
    ///
    /// States waiting on caller input (`Searching`, `BrowsingChildren`) and
    /// terminal states are returned unchanged.
    pub async fn advance(&self, state: ImportState) -> ImportState {
        let next = match state {
            ImportState::ViewingRelease { release_id } => {
                match self.view_release(&release_id).await {
                    Ok(record) => ImportState::ResolvingSideEffects {
                        record: Box::new(record),
                    },
                    Err(e) => {
                        tracing::error!("Release {} could not be fetched: {}", release_id, e);
                        ImportState::Failed {
                            stage: Stage::ViewingRelease,
                            reason: e.to_string(),
                            result: None,
                            warnings: Vec::new(),
                        }
                    }
                }
            }
            ImportState::ResolvingSideEffects { record } => {
                let release = self.resolve_side_effects(*record).await;
                for warning in &release.warnings {
                    tracing::warn!("{}", warning);
                }
                ImportState::Persisting {
                    release: Box::new(release),
                }
            }
            ImportState::Persisting { release } => {
                let result = self.persist(&release).await;
                if result.success {
                    ImportState::Done {
                        result,
                        warnings: release.warnings,
                    }
                } else {
                    ImportState::Failed {
                        stage: Stage::Persisting,
                        reason: result.message.clone(),
                        result: Some(result),
                        warnings: release.warnings,
                    }
                }
            }
            other => return other,
        };

        tracing::info!("Import state -> {}", next.name());
        next
    }

    /// Fetch, resolve and persist one release.
    pub async fn import_release(&self, release_id: &str) -> ImportReport {
        let mut state = ImportState::ViewingRelease {
            release_id: release_id.to_string(),
        };

        while !state.is_terminal() {
            state = self.advance(state).await;
        }

        ImportReport {
            release_id: release_id.to_string(),
            state,
        }
    }
}
