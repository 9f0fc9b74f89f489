//! Record categories and their identity fields.
//!
//! This module defines [`Category`], the fixed set of record kinds the cache
//! stores, and the field each kind is deduplicated on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

/// Kind of record held by the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Price bars, identified by `time`.
    Prices,
    /// Financial metrics, identified by `report_period`.
    FinancialMetrics,
    /// Financial statement line items, identified by `report_period`.
    LineItems,
    /// Insider trades, identified by `filing_date`.
    InsiderTrades,
    /// Company news articles, identified by `date`.
    CompanyNews,
}

impl Category {
    /// All categories, in snapshot column order.
    pub const ALL: [Self; 5] = [
        Self::Prices,
        Self::FinancialMetrics,
        Self::LineItems,
        Self::InsiderTrades,
        Self::CompanyNews,
    ];

    /// Returns the field whose value distinguishes records of this category.
    #[must_use]
    pub const fn identity_field(&self) -> &'static str {
        match self {
            Self::Prices => "time",
            Self::FinancialMetrics | Self::LineItems => "report_period",
            Self::InsiderTrades => "filing_date",
            Self::CompanyNews => "date",
        }
    }

    /// Returns the snake_case name of this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prices => "prices",
            Self::FinancialMetrics => "financial_metrics",
            Self::LineItems => "line_items",
            Self::InsiderTrades => "insider_trades",
            Self::CompanyNews => "company_news",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CacheError::UnknownCategory(s.to_string()))
    }
}
