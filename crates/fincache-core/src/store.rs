//! Durable snapshot storage.
//!
//! The cache persists its full [`CacheState`] as one row of five independently
//! serialized category blobs, stored under [`SNAPSHOT_KEY`]. This module defines
//! the [`SnapshotStore`] trait backends implement and the [`SnapshotBlobs`]
//! encoding exchanged with them.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    category::Category,
    error::{CacheError, Result},
    types::{CacheState, CategoryStore},
};

/// Key of the single snapshot row held by a store.
pub const SNAPSHOT_KEY: &str = "cache";

/// Serialized cache state: one JSON blob per category.
///
/// A `None` blob means the store held no value for that category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotBlobs {
    /// Serialized price store.
    pub prices: Option<String>,
    /// Serialized financial metrics store.
    pub financial_metrics: Option<String>,
    /// Serialized line items store.
    pub line_items: Option<String>,
    /// Serialized insider trades store.
    pub insider_trades: Option<String>,
    /// Serialized company news store.
    pub company_news: Option<String>,
}

impl SnapshotBlobs {
    /// Serializes every category store of `state`.
    ///
    /// # Errors
    /// Returns [`CacheError::Serialization`] if a store cannot be encoded.
    pub fn encode(state: &CacheState) -> Result<Self> {
        let mut blobs = Self::default();
        for category in Category::ALL {
            let json = serde_json::to_string(state.store(category))
                .map_err(|e| CacheError::Serialization(e.to_string()))?;
            *blobs.blob_mut(category) = Some(json);
        }
        Ok(blobs)
    }

    /// Rebuilds a [`CacheState`] from the blobs.
    ///
    /// Every stored record must still carry its category's identity field.
    ///
    /// # Errors
    /// Returns [`CacheError::CorruptSnapshot`] if a blob is missing, cannot be
    /// parsed, or holds a record without an identity value.
    pub fn decode(&self) -> Result<CacheState> {
        let mut state = CacheState::new();
        for category in Category::ALL {
            let json = self.blob(category).ok_or_else(|| {
                CacheError::CorruptSnapshot(format!("missing {category} blob"))
            })?;
            let store: CategoryStore = serde_json::from_str(json)
                .map_err(|e| CacheError::CorruptSnapshot(format!("{category}: {e}")))?;

            for (ticker, records) in &store {
                if let Some(index) = records.iter().position(|r| r.identity(category).is_none()) {
                    return Err(CacheError::CorruptSnapshot(format!(
                        "{category} record {index} for {ticker} has no `{}`",
                        category.identity_field()
                    )));
                }
            }

            *state.store_mut(category) = store;
        }
        Ok(state)
    }

    /// Returns the blob for a category.
    #[must_use]
    pub fn blob(&self, category: Category) -> Option<&str> {
        match category {
            Category::Prices => self.prices.as_deref(),
            Category::FinancialMetrics => self.financial_metrics.as_deref(),
            Category::LineItems => self.line_items.as_deref(),
            Category::InsiderTrades => self.insider_trades.as_deref(),
            Category::CompanyNews => self.company_news.as_deref(),
        }
    }

    /// Returns the blob slot for a category, mutably.
    pub fn blob_mut(&mut self, category: Category) -> &mut Option<String> {
        match category {
            Category::Prices => &mut self.prices,
            Category::FinancialMetrics => &mut self.financial_metrics,
            Category::LineItems => &mut self.line_items,
            Category::InsiderTrades => &mut self.insider_trades,
            Category::CompanyNews => &mut self.company_news,
        }
    }
}

/// Durable backend holding the cache snapshot.
///
/// Implementations store exactly one snapshot, keyed by [`SNAPSHOT_KEY`]; each
/// save replaces the previous one completely.
#[async_trait]
pub trait SnapshotStore: Send + Sync + Debug {
    /// Returns the name of this store (e.g., "sqlite").
    fn name(&self) -> &str;

    /// Creates the schema or container if it does not exist yet.
    ///
    /// Must be safe to call repeatedly.
    async fn initialize(&self) -> Result<()>;

    /// Upserts the snapshot, overwriting any previous one.
    async fn save(&self, blobs: SnapshotBlobs) -> Result<()>;

    /// Reads the snapshot, or `None` if nothing was saved yet.
    async fn load(&self) -> Result<Option<SnapshotBlobs>>;
}
