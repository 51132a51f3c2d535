//! Run configuration.
//!
//! Resolution order, later layers win:
//! 1. Built-in defaults (AAPL, TSLA, MSFT over 2023-01-01..2024-01-31)
//! 2. A TOML file
//! 3. `TICKERLENS_*` environment variables
//! 4. Command-line flags (applied by the binary)

use crate::render::ChartStyle;
use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tickerlens_core::data::{CsvProvider, DataError, DataProvider, SyntheticProvider, YahooProvider};

pub const DEFAULT_SYMBOLS: [&str; 3] = ["AAPL", "TSLA", "MSFT"];
pub const DEFAULT_START: &str = "2023-01-01";
pub const DEFAULT_END: &str = "2024-01-31";

pub const ENV_SYMBOLS: &str = "TICKERLENS_SYMBOLS";
pub const ENV_START: &str = "TICKERLENS_START";
pub const ENV_END: &str = "TICKERLENS_END";
pub const ENV_DATA_DIR: &str = "TICKERLENS_DATA_DIR";
pub const ENV_PLOTS_DIR: &str = "TICKERLENS_PLOTS_DIR";
pub const ENV_SOURCE: &str = "TICKERLENS_SOURCE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("cannot create data provider: {0}")]
    Provider(#[from] DataError),
}

/// Which provider feeds the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Yahoo,
    Synthetic,
    Csv,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(SourceKind::Yahoo),
            "synthetic" => Ok(SourceKind::Synthetic),
            "csv" => Ok(SourceKind::Csv),
            other => Err(format!("unknown source '{other}'. Valid: yahoo, synthetic, csv")),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::Yahoo => "yahoo",
            SourceKind::Synthetic => "synthetic",
            SourceKind::Csv => "csv",
        })
    }
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub symbols: Vec<String>,
    /// First date of the range (inclusive)
    #[serde(deserialize_with = "deserialize_date")]
    pub start: NaiveDate,
    /// Last date of the range (inclusive)
    #[serde(deserialize_with = "deserialize_date")]
    pub end: NaiveDate,
    /// Destination of CSV artifacts and the run manifest
    pub data_dir: PathBuf,
    /// Destination of PNG charts
    pub plots_dir: PathBuf,
    pub source: SourceKind,
    /// Directory of `{SYMBOL}.csv` files for the CSV source
    pub input_dir: Option<PathBuf>,
    pub chart: ChartStyle,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap_or_default(),
            data_dir: PathBuf::from("data"),
            plots_dir: PathBuf::from("plots"),
            source: SourceKind::Yahoo,
            input_dir: None,
            chart: ChartStyle::default(),
        }
    }
}

impl RunConfig {
    /// Load a config from a TOML file. Keys left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: RunConfig = toml::from_str(content)?;
        config.symbols = normalize_symbols(config.symbols.iter().map(String::as_str));
        Ok(config)
    }

    /// Apply `TICKERLENS_*` overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply `TICKERLENS_*` overrides from an arbitrary lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_SYMBOLS) {
            self.symbols = parse_symbols(&v);
        }
        if let Some(v) = lookup(ENV_START) {
            self.start = parse_date(ENV_START, &v)?;
        }
        if let Some(v) = lookup(ENV_END) {
            self.end = parse_date(ENV_END, &v)?;
        }
        if let Some(v) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_PLOTS_DIR) {
            self.plots_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_SOURCE) {
            self.source = v.parse().map_err(|reason| ConfigError::InvalidValue {
                key: ENV_SOURCE.into(),
                value: v.clone(),
                reason,
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("no symbols to fetch".into()));
        }
        if self.start >= self.end {
            return Err(ConfigError::Invalid(format!(
                "start {} must be before end {}",
                self.start, self.end
            )));
        }
        if self.source == SourceKind::Csv && self.input_dir.is_none() {
            return Err(ConfigError::Invalid(
                "the csv source needs an input directory".into(),
            ));
        }
        if self.chart.width == 0
            || self.chart.height == 0
            || self.chart.combined_width == 0
            || self.chart.combined_height == 0
        {
            return Err(ConfigError::Invalid("chart dimensions must be non-zero".into()));
        }
        Ok(())
    }

    /// Build the provider selected by `source`.
    pub fn provider(&self) -> Result<Box<dyn DataProvider>, ConfigError> {
        Ok(match self.source {
            SourceKind::Yahoo => Box::new(YahooProvider::new()?),
            SourceKind::Synthetic => Box::new(SyntheticProvider::new()),
            SourceKind::Csv => {
                let dir = self.input_dir.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("the csv source needs an input directory".into())
                })?;
                Box::new(CsvProvider::new(dir))
            }
        })
    }
}

/// Split a comma-separated symbol list, upper-casing and dropping blanks.
pub fn parse_symbols(list: &str) -> Vec<String> {
    normalize_symbols(list.split(','))
}

fn normalize_symbols<'a>(symbols: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for sym in symbols.map(|s| s.trim().to_ascii_uppercase()) {
        if !sym.is_empty() && !out.contains(&sym) {
            out.push(sym);
        }
    }
    out
}

/// Parse a `YYYY-MM-DD` date for the given setting.
pub fn parse_date(key: &str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Accepts `"2023-01-01"` as well as a bare TOML local date `2023-01-01`.
fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    match toml::Value::deserialize(deserializer)? {
        toml::Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| D::Error::custom(format!("invalid date {s:?}: {e}"))),
        toml::Value::Datetime(dt) => match (dt.date, dt.time) {
            (Some(date), None) => NaiveDate::from_ymd_opt(
                i32::from(date.year),
                u32::from(date.month),
                u32::from(date.day),
            )
            .ok_or_else(|| D::Error::custom(format!("invalid date {dt}"))),
            _ => Err(D::Error::custom(format!(
                "expected a date without a time of day, got {dt}"
            ))),
        },
        other => Err(D::Error::custom(format!(
            "expected a date like 2023-01-01, got a {}",
            other.type_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn defaults_match_the_classic_run() {
        let config = RunConfig::default();
        assert_eq!(config.symbols, vec!["AAPL", "TSLA", "MSFT"]);
        assert_eq!(config.start.to_string(), DEFAULT_START);
        assert_eq!(config.end.to_string(), DEFAULT_END);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.plots_dir, PathBuf::from("plots"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = RunConfig::from_toml(
            r#"
symbols = ["nvda", "amd", "NVDA"]
start = "2022-06-01"
source = "synthetic"

[chart]
width = 800
"#,
        )
        .unwrap();

        assert_eq!(config.symbols, vec!["NVDA", "AMD"]);
        assert_eq!(config.start, d(2022, 6, 1));
        assert_eq!(config.end, d(2024, 1, 31));
        assert_eq!(config.source, SourceKind::Synthetic);
        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.height, ChartStyle::default().height);
    }

    #[test]
    fn toml_accepts_bare_and_quoted_dates() {
        let config = RunConfig::from_toml("start = 2022-06-01\nend = \"2022-12-30\"").unwrap();
        assert_eq!(config.start, d(2022, 6, 1));
        assert_eq!(config.end, d(2022, 12, 30));

        let err = RunConfig::from_toml("start = 2022-06-01T09:30:00").unwrap_err();
        assert!(err.to_string().contains("without a time"), "{err}");
        let err = RunConfig::from_toml("end = \"June 1st\"").unwrap_err();
        assert!(err.to_string().contains("invalid date"), "{err}");
        assert!(RunConfig::from_toml("start = 20220601").is_err());
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = RunConfig::from_toml("tickers = [\"AAPL\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut config = RunConfig::from_toml("symbols = [\"AAPL\"]").unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_SYMBOLS, "msft, goog ,"),
            (ENV_END, "2023-06-30"),
            (ENV_DATA_DIR, "/tmp/out"),
            (ENV_SOURCE, "CSV"),
        ]
        .into_iter()
        .collect();

        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.symbols, vec!["MSFT", "GOOG"]);
        assert_eq!(config.end, d(2023, 6, 30));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.source, SourceKind::Csv);
    }

    #[test]
    fn bad_env_date_names_the_variable() {
        let mut config = RunConfig::default();
        let err = config
            .apply_env(|k| (k == ENV_START).then(|| "01/02/2023".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_START));
    }

    #[test]
    fn validate_rejects_bad_ranges_and_missing_inputs() {
        let mut config = RunConfig::default();
        config.end = config.start;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.symbols.clear();
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.source = SourceKind::Csv;
        assert!(config.validate().is_err());
        config.input_dir = Some(PathBuf::from("data"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn provider_follows_source() {
        let mut config = RunConfig::default();
        config.source = SourceKind::Synthetic;
        assert_eq!(config.provider().unwrap().name(), "synthetic");

        config.source = SourceKind::Csv;
        config.input_dir = Some(PathBuf::from("data"));
        assert_eq!(config.provider().unwrap().name(), "csv_import");
    }

    #[test]
    fn source_kind_parses_case_insensitively() {
        assert_eq!("Yahoo".parse::<SourceKind>(), Ok(SourceKind::Yahoo));
        assert!("bloomberg".parse::<SourceKind>().is_err());
    }
}
