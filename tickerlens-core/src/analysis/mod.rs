//! Exploratory analysis of a single series: missing-value report, summary
//! statistics and the cleaned series.
//!
//! `analyze` is a pure function of its input. Statistics describe the series
//! as fetched (absent values skipped); cleaning runs afterwards.

pub mod clean;
pub mod missing;
pub mod stats;

pub use clean::{clean, forward_fill};
pub use missing::MissingReport;
pub use stats::{FieldStats, SummaryStats, STAT_LABELS};

use crate::domain::Series;

/// Result of analyzing one series.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub missing: MissingReport,
    pub stats: SummaryStats,
    pub cleaned: Series,
}

impl Analysis {
    pub fn into_parts(self) -> (MissingReport, SummaryStats, Series) {
        (self.missing, self.stats, self.cleaned)
    }
}

pub fn analyze(series: &Series) -> Analysis {
    let missing = MissingReport::of(series);
    let stats = SummaryStats::of(series);
    let cleaned = clean(series);

    log::debug!(
        "{}: {} records, {} missing values, {} records after cleaning",
        series.symbol,
        series.len(),
        missing.total(),
        cleaned.len()
    );

    Analysis {
        missing,
        stats,
        cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, PriceRecord};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    /// "TEST" over 2023-01-01..=2023-01-05 with the 2023-01-03 close missing.
    fn test_series() -> Series {
        let records = (1..=5)
            .map(|day| {
                let close = 100.0 + day as f64;
                let mut r = PriceRecord::new(d(day), close - 0.5, close + 1.0, close - 1.0, close, 1_000 * day as u64);
                if day == 3 {
                    r.close = None;
                }
                r
            })
            .collect();
        Series::new("TEST", records)
    }

    #[test]
    fn missing_close_is_reported_and_forward_filled() {
        let (missing, stats, cleaned) = analyze(&test_series()).into_parts();

        assert_eq!(missing[Field::Close], 1);
        assert_eq!(missing.total(), 1);
        assert_eq!(stats.get(Field::Close).count, 4);

        assert_eq!(cleaned.len(), 5);
        let jan2 = cleaned.records.iter().find(|r| r.date == d(2)).unwrap();
        let jan3 = cleaned.records.iter().find(|r| r.date == d(3)).unwrap();
        assert_eq!(jan3.close, jan2.close);
        assert_eq!(jan3.close, Some(102.0));
    }

    #[test]
    fn analyze_is_idempotent() {
        let first = analyze(&test_series());
        let second = analyze(&first.cleaned);

        assert!(second.missing.is_clean());
        assert_eq!(second.cleaned, first.cleaned);
    }

    #[test]
    fn empty_series_does_not_panic() {
        let analysis = analyze(&Series::empty("NONE"));

        assert!(analysis.missing.iter().all(|(_, n)| n == 0));
        assert!(analysis.stats.is_undefined());
        assert!(analysis.cleaned.is_empty());
    }
}
