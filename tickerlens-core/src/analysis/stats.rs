//! Describe-style summary statistics per field.
//!
//! Absent values are skipped. `std` is the unbiased sample standard deviation.
//! Quartiles interpolate linearly between order statistics at position
//! `(n - 1) * q`. Undefined statistics are `NaN`.

use crate::domain::{Field, Series};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Describe-style statistics for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl FieldStats {
    /// Statistics of a field with no values.
    pub const UNDEFINED: FieldStats = FieldStats {
        count: 0,
        mean: f64::NAN,
        std: f64::NAN,
        min: f64::NAN,
        q25: f64::NAN,
        median: f64::NAN,
        q75: f64::NAN,
        max: f64::NAN,
    };

    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::UNDEFINED;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let (lo, hi) = (sorted[0], sorted[sorted.len() - 1]);
        if lo == hi {
            // Summation drifts for values like 0.1; a flat series is exact.
            return Self {
                count: sorted.len(),
                mean: lo,
                std: if sorted.len() < 2 { f64::NAN } else { 0.0 },
                min: lo,
                q25: lo,
                median: lo,
                q75: lo,
                max: hi,
            };
        }

        Self {
            count: sorted.len(),
            mean: mean(&sorted),
            std: sample_std(&sorted),
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        }
    }

    pub fn is_defined(&self) -> bool {
        self.count > 0
    }

    /// The eight statistics in describe order, with `None` for undefined values.
    pub fn row(&self) -> [Option<f64>; 8] {
        let defined = |v: f64| if v.is_nan() { None } else { Some(v) };
        [
            Some(self.count as f64),
            defined(self.mean),
            defined(self.std),
            defined(self.min),
            defined(self.q25),
            defined(self.median),
            defined(self.q75),
            defined(self.max),
        ]
    }
}

/// Column labels matching `FieldStats::row`.
pub const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Per-field statistics of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    fields: BTreeMap<Field, FieldStats>,
}

impl SummaryStats {
    pub fn of(series: &Series) -> Self {
        let fields = Field::ALL
            .iter()
            .map(|&field| (field, FieldStats::from_values(&series.values(field))))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: Field) -> FieldStats {
        self.fields
            .get(&field)
            .copied()
            .unwrap_or(FieldStats::UNDEFINED)
    }

    /// True when no field has a single value, e.g. for an empty series.
    pub fn is_undefined(&self) -> bool {
        self.fields.values().all(|s| !s.is_defined())
    }

    /// `(field, stats)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldStats)> + '_ {
        Field::ALL.iter().map(move |&f| (f, self.get(f)))
    }
}

// ─── Individual statistic functions ─────────────────────────────────

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample standard deviation. `NaN` for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Linear-interpolated quantile of an already sorted slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    let (lo, hi) = (sorted[lower], sorted[upper]);
    // Rounding must not push the result outside its bracketing order statistics.
    (lo + (hi - lo) * weight).max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceRecord;
    use chrono::NaiveDate;

    fn constant_series(n: usize, close: f64) -> Series {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let records = start
            .iter_days()
            .take(n)
            .map(|d| PriceRecord::new(d, close, close, close, close, 1000))
            .collect();
        Series::new("CONST", records)
    }

    #[test]
    fn constant_series_has_zero_std() {
        let stats = SummaryStats::of(&constant_series(10, 100.0));
        let close = stats.get(Field::Close);

        assert_eq!(close.count, 10);
        assert_eq!(close.std, 0.0);
        assert_eq!(close.mean, 100.0);
        assert_eq!(close.min, 100.0);
        assert_eq!(close.max, 100.0);
    }

    #[test]
    fn constant_fractional_values_are_exact() {
        for value in [0.1, 33.33] {
            let close = SummaryStats::of(&constant_series(10, value)).get(Field::Close);

            assert_eq!(close.std, 0.0, "{value}");
            assert_eq!(close.mean, value);
            assert_eq!(close.min, close.mean);
            assert_eq!(close.max, close.mean);
            assert_eq!(close.median, value);
        }

        let single = FieldStats::from_values(&[0.1]);
        assert_eq!(single.mean, 0.1);
        assert!(single.std.is_nan());
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let stats = FieldStats::from_values(&[4.0, 1.0, 3.0, 2.0]);

        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn std_is_unbiased() {
        let stats = FieldStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // population std is 2.0; sample std is sqrt(32 / 7)
        assert!((stats.std - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.mean, 5.0);
    }

    #[test]
    fn single_value_has_undefined_std() {
        let stats = FieldStats::from_values(&[42.0]);
        assert_eq!(stats.count, 1);
        assert!(stats.std.is_nan());
        assert_eq!(stats.median, 42.0);
        assert_eq!(stats.row()[2], None);
    }

    #[test]
    fn empty_series_is_undefined() {
        let stats = SummaryStats::of(&Series::empty("NONE"));
        assert!(stats.is_undefined());
        assert_eq!(stats.get(Field::Close).count, 0);
        assert!(stats.get(Field::Close).mean.is_nan());
        assert_eq!(stats.get(Field::Close).row()[0], Some(0.0));
    }

    #[test]
    fn missing_values_are_skipped() {
        let mut series = constant_series(3, 10.0);
        series.records[1].close = None;
        let close = SummaryStats::of(&series).get(Field::Close);
        assert_eq!(close.count, 2);
        assert!(!SummaryStats::of(&series).is_undefined());
    }
}
