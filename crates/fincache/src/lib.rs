#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fincache/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Deduplicating, persistent cache for financial API records.
//!
//! This crate re-exports the core types and cache implementations, and provides
//! a [`CachedFetcher`] that serves records from the cache and falls back across
//! registered [`RecordSource`]s on a miss.
//!
//! There is no global instance: build one [`RecordCache`] at startup and share
//! it as an `Arc` with everything that reads or writes records.
//!
//! # Features
//!
//! - `cache-sqlite` - SQLite-based snapshot storage (default)
//!
//! # Example
//!
//! ```rust,ignore
//! use fincache::{CategoryCache, Record};
//!
//! #[tokio::main]
//! async fn main() -> fincache::Result<()> {
//!     let cache = fincache::open_default().await?;
//!
//!     cache
//!         .set_prices("AAPL", vec![Record::new().with("time", "2024-01-02").with("close", 185.6)])
//!         .await?;
//!     println!("{:?}", cache.get_prices("AAPL").await);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use fincache_core::*;

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use fincache_cache::SqliteStore;
pub use fincache_cache::{MemoryStore, NoopCache, RecordCache};

mod fetcher;
pub use fetcher::CachedFetcher;

/// Default location of the SQLite cache database.
pub const DEFAULT_CACHE_PATH: &str = "cache.db";

/// Open a SQLite-backed cache at `path`, hydrated from any existing snapshot.
///
/// # Errors
/// Returns an error if the database cannot be opened or its snapshot is corrupt.
#[cfg(feature = "cache-sqlite")]
pub async fn open(path: impl AsRef<std::path::Path>) -> Result<std::sync::Arc<RecordCache>> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Opening record cache");
    let store = SqliteStore::new(path)?;
    let cache = RecordCache::new(std::sync::Arc::new(store)).await?;
    Ok(std::sync::Arc::new(cache))
}

/// Open a SQLite-backed cache at [`DEFAULT_CACHE_PATH`].
///
/// # Errors
/// Returns an error if the database cannot be opened or its snapshot is corrupt.
#[cfg(feature = "cache-sqlite")]
pub async fn open_default() -> Result<std::sync::Arc<RecordCache>> {
    open(DEFAULT_CACHE_PATH).await
}
