//! Series: a symbol's ordered daily records over one date range.

use super::record::{Field, PriceRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    pub records: Vec<PriceRecord>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, records: Vec<PriceRecord>) -> Self {
        Self {
            symbol: symbol.into(),
            records,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    /// Build a series from unordered records: sort by date, keep the first
    /// record for a duplicated date, drop anything outside `[start, end]`.
    pub fn from_unordered(
        symbol: impl Into<String>,
        mut records: Vec<PriceRecord>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        records.retain(|r| r.date >= start && r.date <= end);
        records.sort_by_key(|r| r.date);
        records.dedup_by_key(|r| r.date);
        Self::new(symbol, records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Present values of one field, in date order.
    pub fn values(&self, field: Field) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.value(field)).collect()
    }

    /// `(date, close)` pairs for records with a close.
    pub fn closes(&self) -> Vec<(NaiveDate, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.close.map(|c| (r.date, c)))
            .collect()
    }

    /// True when dates are strictly increasing.
    pub fn is_strictly_ordered(&self) -> bool {
        self.records.windows(2).all(|w| w[0].date < w[1].date)
    }
}
