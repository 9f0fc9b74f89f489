//! SQLite-based snapshot store.

use async_trait::async_trait;
use chrono::Utc;
use fincache_core::{CacheError, Result, SNAPSHOT_KEY, SnapshotBlobs, SnapshotStore};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// SQLite-based store for the cache snapshot.
///
/// The snapshot is a single row of the `cache` table, keyed by [`SNAPSHOT_KEY`],
/// with one JSON column per category. Queries run on tokio's blocking pool via
/// `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a SQLite store at the given path.
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Storage(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| CacheError::Storage(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        debug!(path = %path.display(), "Opened SQLite snapshot store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| CacheError::Storage(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Initialize the database schema.
    fn initialize_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                prices_cache JSON,
                financial_metrics_cache JSON,
                line_items_cache JSON,
                insider_trades_cache JSON,
                company_news_cache JSON,
                updated_at TEXT
            )",
            [],
        )
        .map_err(|e| CacheError::Storage(e.to_string()))?;

        // Tables written before `updated_at` existed lack the column
        let has_updated_at: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('cache') WHERE name = 'updated_at'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| CacheError::Storage(e.to_string()))?;
        if !has_updated_at {
            conn.execute("ALTER TABLE cache ADD COLUMN updated_at TEXT", [])
                .map_err(|e| CacheError::Storage(e.to_string()))?;
            debug!("Added updated_at column to cache table");
        }

        debug!("SQLite snapshot schema initialized");
        Ok(())
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| CacheError::Storage(e.to_string()))?;
            f(&*conn)
        })
        .await
        .map_err(|e| CacheError::Storage(e.to_string()))?
    }

    /// Returns when the snapshot was last saved, as an RFC 3339 timestamp.
    ///
    /// # Errors
    /// Returns an error if the database cannot be read.
    pub async fn updated_at(&self) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let updated_at = conn
                .query_row(
                    "SELECT updated_at FROM cache WHERE key = ?1",
                    params![SNAPSHOT_KEY],
                    |row| row.get::<_, Option<String>>(0),
                )
                .optional()
                .map_err(|e| CacheError::Storage(e.to_string()))?;
            Ok(updated_at.flatten())
        })
        .await
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<()> {
        self.with_conn(Self::initialize_schema).await
    }

    #[instrument(skip(self, blobs))]
    async fn save(&self, blobs: SnapshotBlobs) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO cache
                 (key, prices_cache, financial_metrics_cache, line_items_cache,
                  insider_trades_cache, company_news_cache, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    SNAPSHOT_KEY,
                    blobs.prices,
                    blobs.financial_metrics,
                    blobs.line_items,
                    blobs.insider_trades,
                    blobs.company_news,
                    updated_at
                ],
            )
            .map_err(|e| CacheError::Storage(e.to_string()))?;
            Ok(())
        })
        .await?;

        debug!("Saved snapshot");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<Option<SnapshotBlobs>> {
        let blobs = self
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT prices_cache, financial_metrics_cache, line_items_cache,
                            insider_trades_cache, company_news_cache
                     FROM cache WHERE key = ?1",
                    params![SNAPSHOT_KEY],
                    |row| {
                        Ok(SnapshotBlobs {
                            prices: row.get(0)?,
                            financial_metrics: row.get(1)?,
                            line_items: row.get(2)?,
                            insider_trades: row.get(3)?,
                            company_news: row.get(4)?,
                        })
                    },
                )
                .optional()
                .map_err(|e| CacheError::Storage(e.to_string()))
            })
            .await?;

        match &blobs {
            Some(_) => debug!("Found snapshot"),
            None => debug!("No snapshot found"),
        }
        Ok(blobs)
    }
}
