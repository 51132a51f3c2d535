//! Synthetic data provider for offline runs and tests.
//!
//! Produces a random walk from a starting price of 100.0, seeded from the
//! symbol name so the same symbol always yields the same series.

use super::provider::{validate_request, DataError, DataProvider, DataSource};
use crate::domain::{PriceRecord, Series};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    /// Blank the close of every n-th generated record (1-based).
    pub missing_every: Option<usize>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_every(n: usize) -> Self {
        Self {
            missing_every: Some(n.max(1)),
        }
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Series, DataError> {
        let symbol = validate_request(symbol, start, end)?;
        let mut records = generate_walk(&symbol, start, end);

        if let Some(n) = self.missing_every {
            for (i, record) in records.iter_mut().enumerate() {
                if (i + 1) % n == 0 {
                    record.close = None;
                }
            }
        }

        if records.is_empty() {
            return Err(DataError::NotFound { symbol });
        }
        Ok(Series::new(symbol, records))
    }
}

/// Generate weekday records between `start` and `end` inclusive.
fn generate_walk(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceRecord> {
    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut records = Vec::new();
    let mut price = 100.0_f64;

    for date in start.iter_days().take_while(|d| *d <= end) {
        let weekday = date.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        records.push(PriceRecord::new(date, open, high, low, close, volume));
        price = close;
    }

    records
}
