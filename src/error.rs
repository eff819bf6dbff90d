//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found in the cache
    #[error("no value found for key '{0}'")]
    NotFound(String),

    /// Backend returned something that does not decode into an entry
    #[error("cache may be corrupt, found something for key '{0}' but can't unpack it")]
    CorruptEntry(String),

    /// Caller or construction parameter is invalid
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The invalidation policy vetoed a brand-new key
    #[error("creation denied for key '{key}' with value {value}")]
    CreationDenied { key: String, value: String },

    /// Storage backend failure
    #[error("storage error: {0}")]
    Storage(String),

    /// The cache has been destroyed
    #[error("cache has been destroyed")]
    Destroyed,

    /// Internal failure (e.g. a background task is gone)
    #[error("internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns true if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
