//! Core data types for cached records.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Record`] - A single opaque record returned by a financial data API
//! - [`CategoryStore`] - Ticker to ordered records for one category
//! - [`CacheState`] - The five category stores, the unit of persistence

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{category::Category, error::CacheError};

/// A single record as returned by a financial data API.
///
/// Fields are kept opaque; only the identity field of the record's category is
/// ever read by the cache. Field order is preserved through persistence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the record for chaining.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns the value of a field, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Inserts a field, returning the previous value if any.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Returns the identity value of this record for the given category.
    ///
    /// A `null` identity value counts as missing.
    #[must_use]
    pub fn identity(&self, category: Category) -> Option<&Value> {
        self.get(category.identity_field()).filter(|v| !v.is_null())
    }

    /// Returns a hashable key for the identity value of this record.
    ///
    /// Values are compared by their JSON text, so `"1"` and `1` are distinct.
    /// Whole floats are keyed like integers, so `1.0` and `1` are the same.
    #[must_use]
    pub fn identity_key(&self, category: Category) -> Option<String> {
        self.identity(category).map(|value| match value.as_f64() {
            Some(f) if value.is_f64() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                (f as i64).to_string()
            }
            _ => value.to_string(),
        })
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying field map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record, returning the underlying field map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = CacheError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CacheError::Other(format!(
                "record must be a JSON object, got {other}"
            ))),
        }
    }
}

/// Records of one category, keyed by ticker.
pub type CategoryStore = BTreeMap<String, Vec<Record>>;

/// The full contents of the cache: one [`CategoryStore`] per [`Category`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheState {
    /// Price records.
    pub prices: CategoryStore,
    /// Financial metric records.
    pub financial_metrics: CategoryStore,
    /// Line item records.
    pub line_items: CategoryStore,
    /// Insider trade records.
    pub insider_trades: CategoryStore,
    /// Company news records.
    pub company_news: CategoryStore,
}

impl CacheState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store for a category.
    #[must_use]
    pub const fn store(&self, category: Category) -> &CategoryStore {
        match category {
            Category::Prices => &self.prices,
            Category::FinancialMetrics => &self.financial_metrics,
            Category::LineItems => &self.line_items,
            Category::InsiderTrades => &self.insider_trades,
            Category::CompanyNews => &self.company_news,
        }
    }

    /// Returns the store for a category, mutably.
    pub fn store_mut(&mut self, category: Category) -> &mut CategoryStore {
        match category {
            Category::Prices => &mut self.prices,
            Category::FinancialMetrics => &mut self.financial_metrics,
            Category::LineItems => &mut self.line_items,
            Category::InsiderTrades => &mut self.insider_trades,
            Category::CompanyNews => &mut self.company_news,
        }
    }

    /// Returns true if no category holds any ticker.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.store(*c).is_empty())
    }
}
