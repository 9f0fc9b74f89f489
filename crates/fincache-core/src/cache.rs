//! Cache trait for storing fetched financial records.
//!
//! This module defines the [`CategoryCache`] trait that provides a unified interface
//! for reading and merging records per [`Category`] and ticker.

use async_trait::async_trait;

use crate::{category::Category, error::Result, types::Record};

/// Trait for caching fetched financial records.
///
/// Implementations merge new records into what is already cached, keyed by the
/// category's identity field, so repeated fetches never create duplicates.
/// Consumers should depend on this trait rather than on a concrete cache.
#[async_trait]
pub trait CategoryCache: Send + Sync {
    /// Retrieves cached records for a ticker.
    ///
    /// Returns `None` if the ticker has never been set in this category.
    async fn get(&self, category: Category, ticker: &str) -> Option<Vec<Record>>;

    /// Merges records into the cache for a ticker.
    async fn set(&self, category: Category, ticker: &str, records: Vec<Record>) -> Result<()>;

    /// Retrieves cached price records.
    async fn get_prices(&self, ticker: &str) -> Option<Vec<Record>> {
        self.get(Category::Prices, ticker).await
    }

    /// Merges price records, deduplicated on `time`.
    async fn set_prices(&self, ticker: &str, records: Vec<Record>) -> Result<()> {
        self.set(Category::Prices, ticker, records).await
    }

    /// Retrieves cached financial metrics.
    async fn get_financial_metrics(&self, ticker: &str) -> Option<Vec<Record>> {
        self.get(Category::FinancialMetrics, ticker).await
    }

    /// Merges financial metrics, deduplicated on `report_period`.
    async fn set_financial_metrics(&self, ticker: &str, records: Vec<Record>) -> Result<()> {
        self.set(Category::FinancialMetrics, ticker, records).await
    }

    /// Retrieves cached line items.
    async fn get_line_items(&self, ticker: &str) -> Option<Vec<Record>> {
        self.get(Category::LineItems, ticker).await
    }

    /// Merges line items, deduplicated on `report_period`.
    async fn set_line_items(&self, ticker: &str, records: Vec<Record>) -> Result<()> {
        self.set(Category::LineItems, ticker, records).await
    }

    /// Retrieves cached insider trades.
    async fn get_insider_trades(&self, ticker: &str) -> Option<Vec<Record>> {
        self.get(Category::InsiderTrades, ticker).await
    }

    /// Merges insider trades, deduplicated on `filing_date`.
    async fn set_insider_trades(&self, ticker: &str, records: Vec<Record>) -> Result<()> {
        self.set(Category::InsiderTrades, ticker, records).await
    }

    /// Retrieves cached company news.
    async fn get_company_news(&self, ticker: &str) -> Option<Vec<Record>> {
        self.get(Category::CompanyNews, ticker).await
    }

    /// Merges company news, deduplicated on `date`.
    async fn set_company_news(&self, ticker: &str, records: Vec<Record>) -> Result<()> {
        self.set(Category::CompanyNews, ticker, records).await
    }
}
