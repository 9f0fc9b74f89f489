#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fincache/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Record cache and snapshot stores for fincache.
//!
//! This crate provides the [`RecordCache`] itself, an implementation of the
//! [`CategoryCache`] trait from `fincache-core`, plus the stores it persists to:
//!
//! - [`SqliteStore`] - Persistent SQLite-based store (default, requires `sqlite` feature)
//! - [`MemoryStore`] - Simple in-memory store for testing
//!
//! and [`NoopCache`], a cache that doesn't store anything.

/// In-memory snapshot store.
pub mod memory;
/// No-op cache implementation.
pub mod noop;
/// Persistent, deduplicating record cache.
pub mod record;

/// SQLite-based snapshot store.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the traits for convenience
pub use fincache_core::{CategoryCache, SnapshotStore};

// Re-export implementations
pub use memory::MemoryStore;
pub use noop::NoopCache;
pub use record::RecordCache;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
