//! Integration tests for fetch → analyze → CSV on synthetic and CSV sources.

use chrono::NaiveDate;
use tickerlens_core::analysis::analyze;
use tickerlens_core::data::{write_series, CsvProvider, DataError, DataProvider, SyntheticProvider};
use tickerlens_core::domain::{Field, PriceRecord, Series};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn synthetic_gaps_are_counted_and_filled() {
    let provider = SyntheticProvider::with_missing_every(5);
    let series = provider.fetch("AAPL", d(2023, 1, 1), d(2023, 3, 31)).unwrap();
    let expected_gaps = series.len() / 5;

    let analysis = analyze(&series);

    assert_eq!(analysis.missing[Field::Close], expected_gaps);
    assert_eq!(analysis.missing[Field::Open], 0);
    // The first record has a close, so nothing is dropped.
    assert_eq!(analysis.cleaned.len(), series.len());
    assert!(analysis.cleaned.records.iter().all(PriceRecord::is_complete));
    for (raw, clean) in series.records.windows(2).zip(analysis.cleaned.records.iter().skip(1)) {
        if raw[1].close.is_none() {
            assert_eq!(clean.close, raw[0].close);
        }
    }
}

#[test]
fn saved_series_can_be_refetched_offline() {
    let dir = tempfile::tempdir().unwrap();
    let original = SyntheticProvider::new()
        .fetch("MSFT", d(2023, 1, 1), d(2023, 1, 31))
        .unwrap();

    let file = std::fs::File::create(dir.path().join("MSFT.csv")).unwrap();
    write_series(file, &original).unwrap();

    let provider = CsvProvider::new(dir.path());
    let reloaded = provider.fetch("MSFT", d(2023, 1, 1), d(2023, 1, 31)).unwrap();
    assert_eq!(reloaded, original);

    // A narrower window only returns the matching rows.
    let window = provider.fetch("MSFT", d(2023, 1, 9), d(2023, 1, 13)).unwrap();
    assert_eq!(window.len(), 5);
    assert_eq!(window.first_date(), Some(d(2023, 1, 9)));
}

#[test]
fn invalid_requests_fail_before_any_io() {
    let provider = CsvProvider::new("/nonexistent/tickerlens");
    assert!(matches!(
        provider.fetch("", d(2023, 1, 1), d(2023, 1, 31)),
        Err(DataError::InvalidSymbol(_))
    ));
    assert!(matches!(
        provider.fetch("AAPL", d(2023, 1, 31), d(2023, 1, 1)),
        Err(DataError::InvalidRange { .. })
    ));
}

#[test]
fn constant_closes_describe_cleanly() {
    let records = d(2023, 1, 2)
        .iter_days()
        .take(20)
        .map(|date| PriceRecord::new(date, 100.0, 100.0, 100.0, 100.0, 10))
        .collect();
    let stats = analyze(&Series::new("FLAT", records)).stats;
    let close = stats.get(Field::Close);

    assert_eq!(close.std, 0.0);
    assert_eq!(close.min, 100.0);
    assert_eq!(close.max, 100.0);
    assert_eq!(close.mean, 100.0);
    assert_eq!(close.median, 100.0);
}
