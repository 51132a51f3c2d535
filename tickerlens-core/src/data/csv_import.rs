//! CSV directory provider: re-reads series saved by a previous run.
//!
//! Layout: `{dir}/{SYMBOL}.csv` in the series CSV format.

use super::csv_codec::read_series;
use super::provider::{validate_request, DataError, DataProvider, DataSource};
use crate::domain::Series;
use chrono::NaiveDate;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Series, DataError> {
        let symbol = validate_request(symbol, start, end)?;
        let path = self.symbol_path(&symbol);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DataError::NotFound { symbol })
            }
            Err(e) => {
                return Err(DataError::ResponseFormat(format!(
                    "cannot open {}: {e}",
                    path.display()
                )))
            }
        };

        let raw = read_series(file, &symbol)
            .map_err(|e| DataError::ResponseFormat(format!("{}: {e}", path.display())))?;
        let series = Series::from_unordered(symbol.clone(), raw.records, start, end);
        if series.is_empty() {
            return Err(DataError::NotFound { symbol });
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const CSV: &str = "date,open,high,low,close,volume\n\
        2023-01-04,2,2,2,2,20\n\
        2023-01-03,1,1,1,1,10\n\
        2023-02-01,3,3,3,3,30\n";

    #[test]
    fn reads_sorted_records_within_range() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("AAPL.csv"), CSV).unwrap();

        let provider = CsvProvider::new(dir.path());
        let series = provider.fetch("aapl", d(2023, 1, 1), d(2023, 1, 31)).unwrap();

        assert_eq!(series.symbol, "AAPL");
        assert_eq!(series.len(), 2);
        assert_eq!(series.records[0].date, d(2023, 1, 3));
        assert!(series.is_strictly_ordered());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        let err = provider.fetch("MSFT", d(2023, 1, 1), d(2023, 1, 31)).unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[test]
    fn undecodable_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TSLA.csv"), "date,open\nnot-a-date,1\n").unwrap();
        let provider = CsvProvider::new(dir.path());
        let err = provider.fetch("TSLA", d(2023, 1, 1), d(2023, 1, 31)).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormat(_)));
    }
}
