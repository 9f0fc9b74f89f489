#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fincache/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the fincache record cache.
//!
//! This crate provides the foundational abstractions shared by every cache backend:
//!
//! - [`Category`](category::Category) - The five record kinds and their identity fields
//! - [`Record`](types::Record) and [`CacheState`](types::CacheState) - Cached data
//! - [`merge`](merge::merge) - Identity-based deduplicating merge
//! - [`CategoryCache`](cache::CategoryCache) - Get/set contract consumed by API clients
//! - [`SnapshotStore`](store::SnapshotStore) - Durable snapshot storage
//! - [`RecordSource`](source::RecordSource) - Producers of records

/// Cache trait for reading and merging records.
pub mod cache;
/// Record categories and identity fields.
pub mod category;
/// Error types for cache operations.
pub mod error;
/// Identity-based merging of record batches.
pub mod merge;
/// Source trait for fetching records.
pub mod source;
/// Durable snapshot storage.
pub mod store;
/// Core data types (Record, CategoryStore, CacheState).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::CategoryCache;
pub use category::Category;
pub use error::{CacheError, Result};
pub use merge::{check_identities, merge, merge_into};
pub use source::RecordSource;
pub use store::{SNAPSHOT_KEY, SnapshotBlobs, SnapshotStore};
pub use types::{CacheState, CategoryStore, Record};
