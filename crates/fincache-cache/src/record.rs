//! Persistent, deduplicating record cache.

use async_trait::async_trait;
use fincache_core::{
    CacheState, Category, CategoryCache, Record, Result, SnapshotBlobs, SnapshotStore, merge_into,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Cache of API records for the five record categories.
///
/// State lives in memory and is written through to a [`SnapshotStore`] after
/// every [`set`](CategoryCache::set): the whole state is persisted each time,
/// never a delta. A single async mutex covers the merge and the persist, so a
/// `set` is atomic with respect to other `get`/`set` calls.
///
/// If persisting fails the merged records stay in memory and the error is
/// returned; the next successful persist brings the store back in line.
#[derive(Debug)]
pub struct RecordCache {
    state: Mutex<CacheState>,
    store: Arc<dyn SnapshotStore>,
}

impl RecordCache {
    /// Create a cache backed by `store`, hydrated from its snapshot if one exists.
    ///
    /// # Errors
    /// Returns an error if the store cannot be initialized or its snapshot is
    /// unreadable or corrupt.
    pub async fn new(store: Arc<dyn SnapshotStore>) -> Result<Self> {
        store.initialize().await?;
        let cache = Self {
            state: Mutex::new(CacheState::new()),
            store,
        };
        cache.load().await?;
        Ok(cache)
    }

    /// Replace the in-memory state with the stored snapshot.
    ///
    /// Leaves the state as-is when the store holds no snapshot.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or the snapshot is corrupt.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn load(&self) -> Result<()> {
        // Held across the read so no `set` lands between read and replace
        let mut state = self.state.lock().await;
        let Some(blobs) = self.store.load().await? else {
            debug!("No snapshot found, starting empty");
            return Ok(());
        };

        *state = blobs.decode()?;
        debug!(
            prices = state.prices.len(),
            financial_metrics = state.financial_metrics.len(),
            line_items = state.line_items.len(),
            insider_trades = state.insider_trades.len(),
            company_news = state.company_news.len(),
            "Loaded snapshot"
        );
        Ok(())
    }

    /// Write the full in-memory state to the store.
    ///
    /// # Errors
    /// Returns an error if the state cannot be serialized or written.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn save(&self) -> Result<()> {
        let state = self.state.lock().await;
        self.persist(&state).await
    }

    /// Returns the tickers cached for a category, in sorted order.
    pub async fn tickers(&self, category: Category) -> Vec<String> {
        let state = self.state.lock().await;
        state.store(category).keys().cloned().collect()
    }

    /// Returns a copy of the full cache state.
    pub async fn state(&self) -> CacheState {
        self.state.lock().await.clone()
    }

    async fn persist(&self, state: &CacheState) -> Result<()> {
        let blobs = SnapshotBlobs::encode(state)?;
        self.store.save(blobs).await?;
        debug!("Persisted snapshot");
        Ok(())
    }
}

#[async_trait]
impl CategoryCache for RecordCache {
    #[instrument(skip(self), fields(category = %category, ticker = %ticker))]
    async fn get(&self, category: Category, ticker: &str) -> Option<Vec<Record>> {
        let state = self.state.lock().await;
        match state.store(category).get(ticker) {
            Some(records) => {
                debug!(count = records.len(), "Cache hit");
                Some(records.clone())
            }
            None => {
                debug!("Cache miss");
                None
            }
        }
    }

    #[instrument(skip(self, records), fields(category = %category, ticker = %ticker, count = records.len()))]
    async fn set(&self, category: Category, ticker: &str, records: Vec<Record>) -> Result<()> {
        let mut state = self.state.lock().await;

        let store = state.store_mut(category);
        match store.get_mut(ticker) {
            Some(existing) => {
                merge_into(ticker, category, existing, records)?;
            }
            None => {
                let mut fresh = Vec::new();
                merge_into(ticker, category, &mut fresh, records)?;
                store.insert(ticker.to_string(), fresh);
            }
        }

        if let Err(e) = self.persist(&state).await {
            warn!(error = %e, "Failed to persist snapshot, memory is ahead of store");
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use fincache_core::{CacheError, SnapshotBlobs};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn price(time: &str, close: i64) -> Record {
        Record::new().with("time", time).with("close", close)
    }

    async fn empty_cache() -> (RecordCache, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let cache = RecordCache::new(store.clone()).await.unwrap();
        (cache, store)
    }

    /// Store whose writes can be switched off.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    #[async_trait]
    impl SnapshotStore for FlakyStore {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn initialize(&self) -> Result<()> {
            self.inner.initialize().await
        }

        async fn save(&self, blobs: SnapshotBlobs) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CacheError::Storage("disk full".to_string()));
            }
            self.inner.save(blobs).await
        }

        async fn load(&self) -> Result<Option<SnapshotBlobs>> {
            self.inner.load().await
        }
    }

    /// Store that can pause one `load` after reading the snapshot.
    #[derive(Debug, Default)]
    struct GatedStore {
        inner: MemoryStore,
        armed: AtomicBool,
        reached: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SnapshotStore for GatedStore {
        fn name(&self) -> &str {
            "gated"
        }

        async fn initialize(&self) -> Result<()> {
            self.inner.initialize().await
        }

        async fn save(&self, blobs: SnapshotBlobs) -> Result<()> {
            self.inner.save(blobs).await
        }

        async fn load(&self) -> Result<Option<SnapshotBlobs>> {
            let blobs = self.inner.load().await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.reached.notify_one();
                self.release.notified().await;
            }
            Ok(blobs)
        }
    }

    /// Store that cannot be opened.
    #[derive(Debug)]
    struct UnavailableStore;

    #[async_trait]
    impl SnapshotStore for UnavailableStore {
        fn name(&self) -> &str {
            "unavailable"
        }

        async fn initialize(&self) -> Result<()> {
            Err(CacheError::Storage("permission denied".to_string()))
        }

        async fn save(&self, _blobs: SnapshotBlobs) -> Result<()> {
            Ok(())
        }

        async fn load(&self) -> Result<Option<SnapshotBlobs>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_absent() {
        let (cache, _) = empty_cache().await;
        assert!(cache.get(Category::CompanyNews, "NOPE").await.is_none());
        assert!(cache.get_company_news("NOPE").await.is_none());
    }

    #[tokio::test]
    async fn test_existing_record_wins() {
        let (cache, _) = empty_cache().await;

        cache
            .set_prices("AAPL", vec![price("2024-01-01", 100)])
            .await
            .unwrap();
        assert_eq!(
            cache.get_prices("AAPL").await,
            Some(vec![price("2024-01-01", 100)])
        );

        cache
            .set_prices(
                "AAPL",
                vec![price("2024-01-01", 999), price("2024-01-02", 101)],
            )
            .await
            .unwrap();

        assert_eq!(
            cache.get_prices("AAPL").await,
            Some(vec![price("2024-01-01", 100), price("2024-01-02", 101)])
        );
    }

    #[tokio::test]
    async fn test_every_set_persists() {
        let (cache, store) = empty_cache().await;
        assert!(store.load().await.unwrap().is_none());

        let metrics = vec![Record::new()
            .with("report_period", "2024-03-31")
            .with("pe_ratio", 28.5)];
        cache
            .set_financial_metrics("AAPL", metrics.clone())
            .await
            .unwrap();

        let persisted = store.load().await.unwrap().unwrap().decode().unwrap();
        assert_eq!(persisted.financial_metrics.get("AAPL"), Some(&metrics));
        assert!(persisted.prices.is_empty());
    }

    #[tokio::test]
    async fn test_categories_are_independent() {
        let (cache, _) = empty_cache().await;
        let item = Record::new().with("report_period", "2024-03-31").with("revenue", 1);

        cache.set_line_items("AAPL", vec![item.clone()]).await.unwrap();

        assert_eq!(cache.get_line_items("AAPL").await, Some(vec![item]));
        assert!(cache.get_financial_metrics("AAPL").await.is_none());
        assert_eq!(cache.tickers(Category::LineItems).await, vec!["AAPL"]);
        assert!(cache.tickers(Category::FinancialMetrics).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_identity_is_rejected() {
        let (cache, store) = empty_cache().await;

        let err = cache
            .set_insider_trades("NVDA", vec![Record::new().with("shares", 10)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CacheError::MissingIdentity { field: "filing_date", index: 0, .. }
        ));
        assert!(cache.get_insider_trades("NVDA").await.is_none());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reload_from_store() {
        let (cache, store) = empty_cache().await;
        cache
            .set_company_news(
                "TSLA",
                vec![Record::new().with("date", "2024-06-01").with("title", "Deliveries")],
            )
            .await
            .unwrap();
        cache
            .set_prices("TSLA", vec![price("2024-06-01", 180), price("2024-06-02", 182)])
            .await
            .unwrap();

        let reopened = RecordCache::new(store).await.unwrap();
        assert_eq!(reopened.state().await, cache.state().await);
    }

    #[tokio::test]
    async fn test_load_replaces_memory() {
        let (cache, store) = empty_cache().await;
        cache.set_prices("AAPL", vec![price("2024-01-01", 1)]).await.unwrap();

        let mut other = CacheState::new();
        other
            .prices
            .insert("MSFT".to_string(), vec![price("2024-02-01", 2)]);
        store.save(SnapshotBlobs::encode(&other).unwrap()).await.unwrap();

        cache.load().await.unwrap();

        assert!(cache.get_prices("AAPL").await.is_none());
        assert_eq!(cache.state().await, other);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_fails_construction() {
        let store = Arc::new(MemoryStore::new());
        let mut blobs = SnapshotBlobs::encode(&CacheState::new()).unwrap();
        blobs.line_items = Some("{\"AAPL\": 5}".to_string());
        store.save(blobs).await.unwrap();

        let err = RecordCache::new(store).await.unwrap_err();
        assert!(matches!(err, CacheError::CorruptSnapshot(_)));
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_memory() {
        let store = Arc::new(FlakyStore::default());
        let cache = RecordCache::new(store.clone()).await.unwrap();
        cache.set_prices("AAPL", vec![price("2024-01-01", 1)]).await.unwrap();

        store.failing.store(true, Ordering::SeqCst);
        let err = cache
            .set_prices("AAPL", vec![price("2024-01-02", 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Storage(_)));

        assert_eq!(
            cache.get_prices("AAPL").await,
            Some(vec![price("2024-01-01", 1), price("2024-01-02", 2)])
        );
        let on_disk = store.load().await.unwrap().unwrap().decode().unwrap();
        assert_eq!(on_disk.prices["AAPL"], vec![price("2024-01-01", 1)]);

        store.failing.store(false, Ordering::SeqCst);
        cache.save().await.unwrap();
        let on_disk = store.load().await.unwrap().unwrap().decode().unwrap();
        assert_eq!(on_disk, cache.state().await);
    }

    #[tokio::test]
    async fn test_concurrent_sets_keep_identities_unique() {
        let (cache, _) = empty_cache().await;
        let cache = Arc::new(cache);

        let mut handles = Vec::new();
        for worker in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let batch = (0..10)
                    .map(|day| price(&format!("2024-01-{:02}", day + 1), worker))
                    .collect();
                cache.set_prices("AAPL", batch).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = cache.get_prices("AAPL").await.unwrap();
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_construction() {
        let err = RecordCache::new(Arc::new(UnavailableStore)).await.unwrap_err();
        assert!(matches!(err, CacheError::Storage(_)));
    }

    #[tokio::test]
    async fn test_set_during_load_is_not_lost() {
        let store = Arc::new(GatedStore::default());
        let cache = Arc::new(RecordCache::new(store.clone()).await.unwrap());
        cache.set_prices("AAPL", vec![price("2024-01-01", 1)]).await.unwrap();

        store.armed.store(true, Ordering::SeqCst);
        let loader = tokio::spawn({
            let cache = cache.clone();
            async move { cache.load().await }
        });
        store.reached.notified().await;

        let mut writer = tokio::spawn({
            let cache = cache.clone();
            async move { cache.set_prices("MSFT", vec![price("2024-01-01", 2)]).await }
        });
        // The write waits for the in-flight load
        assert!(
            tokio::time::timeout(Duration::from_millis(50), &mut writer)
                .await
                .is_err()
        );

        store.release.notify_one();
        loader.await.unwrap().unwrap();
        writer.await.unwrap().unwrap();
        cache.set_prices("AAPL", vec![price("2024-01-02", 3)]).await.unwrap();

        assert_eq!(
            cache.get_prices("MSFT").await,
            Some(vec![price("2024-01-01", 2)])
        );
        let on_disk = store.load().await.unwrap().unwrap().decode().unwrap();
        assert_eq!(on_disk.prices["MSFT"], vec![price("2024-01-01", 2)]);
        assert_eq!(on_disk, cache.state().await);
    }

    #[tokio::test]
    async fn test_rejected_batch_does_not_create_ticker() {
        let (cache, _) = empty_cache().await;

        let result = cache
            .set_company_news("AAPL", vec![Record::new().with("title", "No date")])
            .await;

        assert!(result.is_err());
        assert!(cache.tickers(Category::CompanyNews).await.is_empty());
    }
}
