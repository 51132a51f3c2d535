//! Run manifest: a JSON record of what a run fetched, wrote and failed on.
//!
//! Written to `{data_dir}/manifest.json` at the end of every run, including
//! runs where some symbols failed.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tickerlens_core::domain::Series;
use tickerlens_core::DataSource;

/// Bump when the manifest layout changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolStatus {
    /// Fetched, analyzed and every artifact written
    Ok,
    /// Fetched and analyzed, but a chart or file failed
    Partial,
    /// Nothing could be fetched
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub symbol: String,
    pub status: SymbolStatus,
    pub records_fetched: usize,
    pub records_cleaned: usize,
    pub missing_values: usize,
    /// blake3 of the cleaned series, absent when nothing was fetched
    pub data_hash: Option<String>,
    pub artifacts: Vec<PathBuf>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub generated_at: NaiveDateTime,
    pub source: DataSource,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub symbols: Vec<SymbolEntry>,
    /// Cross-symbol tables and the combined chart
    pub artifacts: Vec<PathBuf>,
    /// Failures outside any single symbol
    pub errors: Vec<String>,
}

impl RunManifest {
    pub fn new(source: DataSource, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: chrono::Local::now().naive_local(),
            source,
            start,
            end,
            symbols: Vec::new(),
            artifacts: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn failed_symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols
            .iter()
            .filter(|s| s.status != SymbolStatus::Ok)
            .map(|s| s.symbol.as_str())
    }
}

/// Content hash of a series: dates and values, independent of the symbol.
pub fn series_hash(series: &Series) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in &series.records {
        hasher.update(r.date.to_string().as_bytes());
        for v in [r.open, r.high, r.low, r.close] {
            match v {
                Some(x) => hasher.update(&x.to_le_bytes()),
                None => hasher.update(b"-"),
            };
        }
        match r.volume {
            Some(x) => hasher.update(&x.to_le_bytes()),
            None => hasher.update(b"-"),
        };
    }
    hasher.finalize().to_hex().to_string()
}
