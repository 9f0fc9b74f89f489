//! In-memory snapshot store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fincache_core::{Result, SnapshotBlobs, SnapshotStore};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Stored snapshot with the time it was written.
#[derive(Debug, Clone)]
struct StoredSnapshot {
    blobs: SnapshotBlobs,
    saved_at: DateTime<Utc>,
}

/// Snapshot store that keeps the snapshot in process memory.
///
/// Nothing survives the process; useful for tests and for sharing one snapshot
/// between several caches in the same process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RwLock<Option<StoredSnapshot>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns when the current snapshot was saved, if any.
    pub async fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.as_ref().map(|s| s.saved_at)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    #[instrument(skip(self, blobs))]
    async fn save(&self, blobs: SnapshotBlobs) -> Result<()> {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Some(StoredSnapshot {
            blobs,
            saved_at: Utc::now(),
        });
        debug!("Stored snapshot in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<Option<SnapshotBlobs>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.as_ref().map(|s| s.blobs.clone()))
    }
}
