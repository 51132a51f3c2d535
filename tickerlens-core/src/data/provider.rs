//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! directory, synthetic walk) so the pipeline can swap implementations and
//! tests can run without network access.

use crate::domain::Series;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for data acquisition.
///
/// These are designed to be displayable in CLI output and log lines.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    NotFound { symbol: String },

    #[error("network unreachable: {0}")]
    TransientNetwork(String),

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("invalid date range: start {start} must be before end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid symbol: {0:?}")]
    InvalidSymbol(String),
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Trait for data providers (Yahoo Finance, CSV import, etc).
///
/// Implementations return a series whose dates are strictly increasing and
/// fall inside `[start, end]`. Nothing retries: a failed call is reported
/// once and the caller decides what to do with the symbol.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Provenance tag recorded in the run manifest.
    fn source(&self) -> DataSource;

    /// Fetch daily OHLCV records for a symbol over a date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Series, DataError>;
}

/// Check the shared preconditions of `fetch` and return the normalized symbol.
pub fn validate_request(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<String, DataError> {
    let symbol = symbol.trim();
    if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
        return Err(DataError::InvalidSymbol(symbol.to_string()));
    }
    if start >= end {
        return Err(DataError::InvalidRange { start, end });
    }
    Ok(symbol.to_ascii_uppercase())
}
