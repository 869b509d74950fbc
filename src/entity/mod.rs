//! Entity adapters - map canonical releases onto host storage.
//!
//! An entity adapter receives a [`PreparedRelease`]: the fetched record
//! plus whatever the side-effect resolvers produced. It only maps fields
//! and reports the outcome; it never resolves categories or images itself.
//!
//! Saving is not idempotent. Saving the same release twice creates two
//! stored objects.

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{EntityTypeInfo, ReleaseRecord, SaveResult};
use crate::resolve::{AssetRef, ResolverWarning, TermRef};

pub use sqlite::{ENTITY_ID, SqliteReleaseStore};

/// A release ready to persist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRelease {
    pub record: ReleaseRecord,
    /// Resolved category terms, in category order
    pub terms: Vec<TermRef>,
    /// Stored primary image, if it resolved
    pub image: Option<AssetRef>,
    /// Resolver degradations recorded along the way
    pub warnings: Vec<ResolverWarning>,
}

impl PreparedRelease {
    /// Wrap a record with no resolved side effects.
    pub fn bare(record: ReleaseRecord) -> Self {
        Self {
            record,
            ..Default::default()
        }
    }
}

/// Host storage for imported releases.
#[async_trait]
pub trait EntityAdapter: Send + Sync {
    /// Static description of the stored entity type.
    fn describe_type(&self) -> EntityTypeInfo;

    /// Persist a release. Storage failures come back as
    /// `SaveResult { success: false, .. }`, never as a panic or error.
    async fn save_release(&self, release: &PreparedRelease) -> SaveResult;
}
