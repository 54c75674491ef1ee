//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Absence of a key is never an error; lookups return `Option` instead.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The factory passed to `get_or_set` failed.
    ///
    /// The source is shared so every caller waiting on the same computation
    /// receives the same error.
    #[error("Factory failed for key '{key}': {cause:#}")]
    Factory {
        key: String,
        cause: Arc<anyhow::Error>,
    },

    /// Configuration rejected at startup
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Wraps a factory failure for `key`.
    pub fn factory(key: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        CacheError::Factory {
            key: key.into(),
            cause: Arc::new(source.into()),
        }
    }

    /// Returns the underlying factory error, if this is a factory failure.
    pub fn factory_source(&self) -> Option<&anyhow::Error> {
        match self {
            CacheError::Factory { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
