//! Source trait for fetching records from an external API.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{category::Category, error::Result, types::Record};

/// A producer of records, typically a financial data API client.
///
/// Implementations return records of the requested category, each carrying
/// that category's identity field.
#[async_trait]
pub trait RecordSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "Financial Datasets").
    fn name(&self) -> &str;

    /// Returns the categories this source can serve.
    fn supported_categories(&self) -> &[Category] {
        &Category::ALL
    }

    /// Fetches records for a ticker.
    async fn fetch(&self, category: Category, ticker: &str) -> Result<Vec<Record>>;
}
