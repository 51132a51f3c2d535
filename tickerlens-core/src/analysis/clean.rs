//! Missing-value cleaning: forward-fill, then drop leading gaps.
//!
//! Each field is filled independently from the most recent prior value of
//! that field. Records that still have a gap afterwards can only sit at the
//! start of the series, before the first value of some field, and are dropped.

use crate::domain::{PriceRecord, Series};

pub fn forward_fill(series: &Series) -> Series {
    let mut last_open = None;
    let mut last_high = None;
    let mut last_low = None;
    let mut last_close = None;
    let mut last_volume = None;

    let records: Vec<PriceRecord> = series
        .records
        .iter()
        .map(|r| {
            last_open = r.open.or(last_open);
            last_high = r.high.or(last_high);
            last_low = r.low.or(last_low);
            last_close = r.close.or(last_close);
            last_volume = r.volume.or(last_volume);
            PriceRecord {
                date: r.date,
                open: last_open,
                high: last_high,
                low: last_low,
                close: last_close,
                volume: last_volume,
            }
        })
        .collect();

    Series::new(series.symbol.clone(), records)
}

/// Apply the cleaning policy. The result has no absent values.
pub fn clean(series: &Series) -> Series {
    let filled = forward_fill(series);
    let first_complete = filled
        .records
        .iter()
        .position(PriceRecord::is_complete)
        .unwrap_or(filled.records.len());

    if first_complete > 0 {
        log::debug!(
            "{}: dropping {first_complete} leading records with no prior value",
            series.symbol
        );
    }

    Series::new(series.symbol.clone(), filled.records[first_complete..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    fn rec(day: u32, close: Option<f64>) -> PriceRecord {
        PriceRecord {
            date: d(day),
            open: Some(10.0),
            high: Some(11.0),
            low: Some(9.0),
            close,
            volume: Some(1000),
        }
    }

    #[test]
    fn interior_gap_takes_previous_value() {
        let series = Series::new("T", vec![rec(2, Some(10.5)), rec(3, None), rec(4, Some(10.7))]);
        let cleaned = clean(&series);

        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned.records[1].close, Some(10.5));
        assert_eq!(cleaned.records[2].close, Some(10.7));
    }

    #[test]
    fn leading_gaps_are_dropped() {
        let series = Series::new("T", vec![rec(2, None), rec(3, None), rec(4, Some(10.7)), rec(5, None)]);
        let cleaned = clean(&series);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.records[0].date, d(4));
        assert_eq!(cleaned.records[1].close, Some(10.7));
    }

    #[test]
    fn fields_fill_independently() {
        let mut first = rec(2, Some(1.0));
        first.volume = None;
        let mut second = rec(3, Some(2.0));
        second.open = None;
        let third = rec(4, Some(3.0));

        let cleaned = clean(&Series::new("T", vec![first, second, third]));

        // First record has no prior volume, so it is dropped.
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.records[0].date, d(3));
        assert_eq!(cleaned.records[0].open, Some(10.0));
    }

    #[test]
    fn all_missing_field_empties_the_series() {
        let series = Series::new("T", vec![rec(2, None), rec(3, None)]);
        assert!(clean(&series).is_empty());
    }
}
