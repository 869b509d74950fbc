//! Category resolution: category strings -> taxonomy term references.
//!
//! Each category is looked up by exact name within the configured
//! vocabulary and created when missing. Lookup-then-create is not atomic:
//! two concurrent imports introducing the same new category can each
//! create a term. Stores that need at-most-once creation must enforce a
//! uniqueness constraint themselves.

use std::sync::Arc;

use super::{ResolveError, ResolverWarning, TaxonomyStore, TermRef, WarningKind};

/// Terms resolved for a release, in input order.
#[derive(Debug, Clone, Default)]
pub struct CategoryResolution {
    pub terms: Vec<TermRef>,
    pub warnings: Vec<ResolverWarning>,
}

/// Resolves categories against one vocabulary of a [`TaxonomyStore`].
pub struct CategoryResolver {
    store: Arc<dyn TaxonomyStore>,
    vocabulary: String,
}

impl CategoryResolver {
    pub fn new(store: Arc<dyn TaxonomyStore>, vocabulary: impl Into<String>) -> Self {
        Self {
            store,
            vocabulary: vocabulary.into(),
        }
    }

    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }

    /// Resolve every category, skipping the ones that fail.
    ///
    /// The output mirrors input order; duplicates in the input yield
    /// repeated references to the same term.
    pub async fn resolve(&self, categories: &[String]) -> CategoryResolution {
        let mut resolution = CategoryResolution::default();

        for category in categories {
            match self.resolve_one(category).await {
                Ok(term) => resolution.terms.push(term),
                Err(e) => {
                    tracing::warn!(
                        "Category '{}' not resolved in '{}': {}",
                        category,
                        self.vocabulary,
                        e
                    );
                    resolution.warnings.push(ResolverWarning {
                        kind: WarningKind::Category,
                        subject: category.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        resolution
    }

    async fn resolve_one(&self, name: &str) -> Result<TermRef, ResolveError> {
        if let Some(term) = self.store.find_term(&self.vocabulary, name).await? {
            return Ok(term);
        }

        let term = self.store.create_term(&self.vocabulary, name).await?;
        tracing::info!("Created term '{}' in '{}'", name, self.vocabulary);
        Ok(term)
    }
}
