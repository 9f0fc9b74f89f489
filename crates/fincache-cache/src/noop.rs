//! No-op cache implementation.

use async_trait::async_trait;
use fincache_core::{Category, CategoryCache, Record, Result};
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always returns `None` and `set` always returns `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CategoryCache for NoopCache {
    async fn get(&self, category: Category, _ticker: &str) -> Option<Vec<Record>> {
        trace!(%category, "NoopCache: get called, returning None");
        None
    }

    async fn set(&self, category: Category, _ticker: &str, _records: Vec<Record>) -> Result<()> {
        trace!(%category, "NoopCache: set called, doing nothing");
        Ok(())
    }
}
