//! Cache-first fetching across multiple record sources.

use std::sync::Arc;

use tracing::{debug, warn};

use fincache_core::{CacheError, Category, CategoryCache, Record, RecordSource, Result};

/// Fetches records through a cache, falling back across sources.
///
/// The `CachedFetcher` checks the cache first. On a miss it tries each
/// registered source that supports the category, in registration order, and
/// merges the first successful batch into the cache.
///
/// # Example
///
/// ```rust,ignore
/// use fincache::{CachedFetcher, Category};
///
/// let cache = fincache::open("cache.db").await?;
/// let mut fetcher = CachedFetcher::with_cache(cache);
/// fetcher.register(Arc::new(MyApiClient::new(api_key)));
///
/// let prices = fetcher.fetch(Category::Prices, "AAPL").await?;
/// ```
#[derive(Default)]
pub struct CachedFetcher {
    sources: Vec<Arc<dyn RecordSource>>,
    cache: Option<Arc<dyn CategoryCache>>,
}

impl std::fmt::Debug for CachedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedFetcher")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .finish()
    }
}

impl CachedFetcher {
    /// Create a new fetcher with no sources and no cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new fetcher with a cache.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn CategoryCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Default::default()
        }
    }

    /// Set the cache for this fetcher.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn CategoryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register a record source.
    pub fn register(&mut self, source: Arc<dyn RecordSource>) {
        debug!(source = source.name(), "Registering record source");
        self.sources.push(source);
    }

    /// Fetch records for a ticker, serving from the cache when possible.
    ///
    /// A cached empty sequence counts as a miss. Failing to cache a fetched
    /// batch is logged and does not fail the fetch.
    ///
    /// # Errors
    /// Returns [`CacheError::SourceNotConfigured`] if no source supports the
    /// category, or the last source error if every source fails.
    pub async fn fetch(&self, category: Category, ticker: &str) -> Result<Vec<Record>> {
        let sources: Vec<_> = self
            .sources
            .iter()
            .filter(|s| s.supported_categories().contains(&category))
            .collect();
        if sources.is_empty() {
            return Err(CacheError::SourceNotConfigured(format!(
                "No source registered for {category}"
            )));
        }

        // Check cache first
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(category, ticker).await {
                if !cached.is_empty() {
                    debug!(%category, ticker, count = cached.len(), "Serving from cache");
                    return Ok(cached);
                }
            }
        }

        // Try each source in order
        let mut last_error = None;
        for source in sources {
            debug!(source = source.name(), %category, ticker, "Fetching records");

            match source.fetch(category, ticker).await {
                Ok(records) => {
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache.set(category, ticker, records.clone()).await {
                            warn!(
                                source = source.name(),
                                error = %e,
                                "Failed to cache fetched records"
                            );
                        }
                    }
                    return Ok(records);
                }
                Err(e) => {
                    warn!(
                        source = source.name(),
                        error = %e,
                        "Source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CacheError::Other("All sources failed with no error".to_string())))
    }
}
