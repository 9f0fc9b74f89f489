//! Identity-based merging of record batches.
//!
//! New records are appended after existing ones unless a record with the same
//! identity value is already known. Existing records always win, and within a
//! single incoming batch the first occurrence of an identity value wins.

use std::collections::HashSet;
use tracing::debug;

use crate::{
    category::Category,
    error::{CacheError, Result},
    types::Record,
};

/// Checks that every record carries the identity field of `category`.
///
/// # Errors
/// Returns [`CacheError::MissingIdentity`] for the first record without one.
pub fn check_identities(ticker: &str, category: Category, records: &[Record]) -> Result<()> {
    match records.iter().position(|r| r.identity(category).is_none()) {
        Some(index) => Err(CacheError::MissingIdentity {
            category,
            ticker: ticker.to_string(),
            field: category.identity_field(),
            index,
        }),
        None => Ok(()),
    }
}

/// Merges `incoming` into `existing` in place and returns how many records were admitted.
///
/// `existing` keeps its order; admitted records follow in their incoming order.
/// The batch is validated up front, so on error `existing` is untouched.
///
/// # Errors
/// Returns [`CacheError::MissingIdentity`] if any incoming record lacks the
/// category's identity field.
pub fn merge_into(
    ticker: &str,
    category: Category,
    existing: &mut Vec<Record>,
    incoming: Vec<Record>,
) -> Result<usize> {
    check_identities(ticker, category, &incoming)?;

    let mut seen: HashSet<String> = existing
        .iter()
        .filter_map(|r| r.identity_key(category))
        .collect();

    let before = existing.len();
    let offered = incoming.len();
    existing.extend(incoming.into_iter().filter(|record| {
        record
            .identity_key(category)
            .is_some_and(|key| seen.insert(key))
    }));

    let admitted = existing.len() - before;
    debug!(
        %category,
        ticker,
        offered,
        admitted,
        "Merged incoming records"
    );
    Ok(admitted)
}

/// Returns `existing` followed by the records of `incoming` not already present.
///
/// With an empty `existing` the result is `incoming` itself, minus any repeated
/// identity values within the batch.
///
/// # Errors
/// Returns [`CacheError::MissingIdentity`] if any incoming record lacks the
/// category's identity field.
pub fn merge(
    ticker: &str,
    category: Category,
    existing: &[Record],
    incoming: Vec<Record>,
) -> Result<Vec<Record>> {
    let mut merged = existing.to_vec();
    merge_into(ticker, category, &mut merged, incoming)?;
    Ok(merged)
}
