//! PriceRecord: one trading day of OHLCV data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric columns of a price record, in CSV column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
    ];

    /// Column name used in every CSV artifact.
    pub fn name(self) -> &'static str {
        match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Daily OHLCV record for a single symbol.
///
/// `None` marks a value the provider did not deliver. Field order matches the
/// CSV layout `date,open,high,low,close,volume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl PriceRecord {
    /// A record with every value present.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }

    /// Value of a field as `f64`, or `None` when absent.
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Open => self.open,
            Field::High => self.high,
            Field::Low => self.low,
            Field::Close => self.close,
            Field::Volume => self.volume.map(|v| v as f64),
        }
    }

    pub fn is_missing(&self, field: Field) -> bool {
        self.value(field).is_none()
    }

    /// True when every field is present.
    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|f| !self.is_missing(*f))
    }

    /// True when every field is absent (holiday rows from some providers).
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.is_missing(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PriceRecord {
        PriceRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            100.0,
            105.0,
            98.0,
            103.0,
            50_000,
        )
    }

    #[test]
    fn record_is_complete() {
        assert!(sample_record().is_complete());
        assert!(!sample_record().is_empty());
    }

    #[test]
    fn record_detects_missing_close() {
        let mut record = sample_record();
        record.close = None;
        assert!(record.is_missing(Field::Close));
        assert!(!record.is_complete());
        assert_eq!(record.value(Field::Open), Some(100.0));
    }

    #[test]
    fn volume_reads_as_float() {
        assert_eq!(sample_record().value(Field::Volume), Some(50_000.0));
    }

    #[test]
    fn field_names_match_csv_columns() {
        let names: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["open", "high", "low", "close", "volume"]);
    }
}
