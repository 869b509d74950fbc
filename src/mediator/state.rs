//! Import states, stages and mediator errors.

use std::fmt;

use crate::entity::PreparedRelease;
use crate::model::{ReleaseRecord, SaveResult, SearchResultPage};
use crate::provider::ProviderError;
use crate::resolve::ResolverWarning;

/// The stage an error or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Searching,
    BrowsingChildren,
    ViewingRelease,
    ResolvingSideEffects,
    Persisting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Searching => "searching",
            Stage::BrowsingChildren => "browsing children",
            Stage::ViewingRelease => "viewing release",
            Stage::ResolvingSideEffects => "resolving side effects",
            Stage::Persisting => "persisting",
        })
    }
}

/// Where an import currently stands.
///
/// `Searching` and `BrowsingChildren` wait for the caller to pick a row.
/// From `ViewingRelease` on, [`Mediator::advance`](super::Mediator::advance)
/// moves forward on its own until `Done` or `Failed`. No state is ever
/// re-entered automatically.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportState {
    Searching,
    BrowsingChildren {
        search_type: String,
        parent_id: String,
    },
    ViewingRelease {
        release_id: String,
    },
    ResolvingSideEffects {
        record: Box<ReleaseRecord>,
    },
    Persisting {
        release: Box<PreparedRelease>,
    },
    Done {
        result: SaveResult,
        warnings: Vec<ResolverWarning>,
    },
    Failed {
        stage: Stage,
        reason: String,
        /// The entity adapter's answer when persisting failed
        result: Option<SaveResult>,
        /// Resolver warnings gathered before the failure
        warnings: Vec<ResolverWarning>,
    },
}

impl ImportState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportState::Done { .. } | ImportState::Failed { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImportState::Searching => "SEARCHING",
            ImportState::BrowsingChildren { .. } => "BROWSING_CHILDREN",
            ImportState::ViewingRelease { .. } => "VIEWING_RELEASE",
            ImportState::ResolvingSideEffects { .. } => "RESOLVING_SIDE_EFFECTS",
            ImportState::Persisting { .. } => "PERSISTING",
            ImportState::Done { .. } => "DONE",
            ImportState::Failed { .. } => "FAILED",
        }
    }
}

/// What selecting a row of a search page leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Row ids are release ids
    ViewRelease,
    /// Row ids are intermediate entities to browse
    BrowseChildren,
}

/// A validated search page and where its rows lead.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub page: SearchResultPage,
    pub next: NextStep,
}

/// Final state of [`Mediator::import_release`](super::Mediator::import_release).
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub release_id: String,
    pub state: ImportState,
}

impl ImportReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.state, ImportState::Done { .. })
    }

    /// The entity adapter's result, when persistence was reached.
    pub fn save_result(&self) -> Option<&SaveResult> {
        match &self.state {
            ImportState::Done { result, .. } => Some(result),
            ImportState::Failed { result, .. } => result.as_ref(),
            _ => None,
        }
    }

    pub fn warnings(&self) -> &[ResolverWarning] {
        match &self.state {
            ImportState::Done { warnings, .. } | ImportState::Failed { warnings, .. } => warnings,
            _ => &[],
        }
    }
}

/// Mediator errors.
#[derive(Debug, thiserror::Error)]
pub enum MediatorError {
    #[error("Unknown search type '{0}'")]
    UnknownSearchType(String),

    #[error("Filter '{filter}' is not defined for search type '{search_type}'")]
    UnknownFilter { search_type: String, filter: String },

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("Search type '{0}' returns releases and has no children")]
    NotBrowsable(String),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ProviderError,
    },
}

impl MediatorError {
    pub(crate) fn at(stage: Stage) -> impl FnOnce(ProviderError) -> Self {
        move |source| MediatorError::Stage { stage, source }
    }

    /// Whether the caller may retry the same call unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            MediatorError::Stage { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}
