//! Error types for cache operations.
//!
//! This module defines [`CacheError`] which covers all error cases that can occur
//! when merging, persisting, or loading cached records.

use thiserror::Error;

use crate::category::Category;

/// Errors that can occur during cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The durable store could not be opened, read, or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A persisted snapshot exists but cannot be turned back into cache state.
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// An incoming record lacks the identity field of its category.
    #[error("Record {index} for {ticker} in {category} is missing identity field `{field}`")]
    MissingIdentity {
        /// Category the record was written to.
        category: Category,
        /// Ticker the record was written under.
        ticker: String,
        /// The identity field that was expected.
        field: &'static str,
        /// Position of the offending record in the incoming batch.
        index: usize,
    },

    /// A category name did not match any known category.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Cache state could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A record source failed to produce records.
    #[error("Source error: {0}")]
    Source(String),

    /// No record source is configured.
    #[error("Source not configured: {0}")]
    SourceNotConfigured(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`CacheError`].
pub type Result<T> = std::result::Result<T, CacheError>;
