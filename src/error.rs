//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the
//! CLI uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum
//! - Subsystem errors ([`ProviderError`], [`MediatorError`], [`ResolveError`],
//!   [`ConfigError`]) for detailed handling
//! - Persistence failures during an import are not errors at all: they come
//!   back as `SaveResult { success: false }`
//!
//! # Example
//!
//! ```ignore
//! use discog_mediator::error::{Result, ResultExt};
//!
//! async fn open(url: &str) -> Result<SqlitePool> {
//!     init_db(url).await.with_context("opening release database")
//! }
//! ```

use crate::config::ConfigError;
use crate::mediator::MediatorError;
use crate::provider::ProviderError;
use crate::resolve::ResolveError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Provider adapter error outside an import stage
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Import stage or validation error
    #[error("Import error: {0}")]
    Mediator(#[from] MediatorError),

    /// Resolver construction error
    #[error("Resolver error: {0}")]
    Resolve(#[from] ResolveError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No adapter registered under the requested id
    #[error("Unknown {kind} adapter '{id}'")]
    UnknownAdapter { kind: &'static str, id: String },

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an unknown provider error.
    pub fn unknown_provider(id: impl Into<String>) -> Self {
        Self::UnknownAdapter {
            kind: "provider",
            id: id.into(),
        }
    }

    /// Create an unknown entity error.
    pub fn unknown_entity(id: impl Into<String>) -> Self {
        Self::UnknownAdapter {
            kind: "entity",
            id: id.into(),
        }
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, ProviderError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Provider(e).context(ctx))
    }
}
