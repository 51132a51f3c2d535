//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV records from Yahoo's v8 chart API with a single HTTP
//! request per symbol. Failures are classified and returned; nothing retries.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! The CSV provider is the fallback when Yahoo is unavailable.

use super::provider::{validate_request, DataError, DataProvider, DataSource};
use crate::domain::{PriceRecord, Series};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const CHART_ENDPOINT: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::TransientNetwork(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Build the chart API URL for a symbol and an inclusive date range.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(chrono::NaiveTime::MIN).and_utc().timestamp() + 86_399;
        format!(
            "{CHART_ENDPOINT}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d&events=history"
        )
    }

    /// Decode a chart API body into a series bounded to `[start, end]`.
    pub fn parse_chart(
        symbol: &str,
        body: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, DataError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormat(format!("failed to parse response for {symbol}: {e}"))
        })?;
        let records = Self::parse_response(symbol, resp)?;
        let series = Series::from_unordered(symbol, records, start, end);
        if series.is_empty() {
            return Err(DataError::NotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(series)
    }

    /// Parse the chart API response into records.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceRecord>, DataError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (Some(result), _) => result,
            (None, Some(err)) if err.code == "Not Found" => {
                return Err(DataError::NotFound {
                    symbol: symbol.to_string(),
                })
            }
            (None, Some(err)) => {
                return Err(DataError::ResponseFormat(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (None, None) => {
                return Err(DataError::ResponseFormat("empty result with no error".into()))
            }
        };

        let Some(data) = result.into_iter().next() else {
            return Err(DataError::NotFound {
                symbol: symbol.to_string(),
            });
        };

        // A valid symbol with no trading days in range comes back without timestamps.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormat("no quote data".into()))?;

        let mut records = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| DataError::ResponseFormat(format!("invalid timestamp: {ts}")))?;

            let record = PriceRecord {
                date,
                open: quote.open.get(i).copied().flatten(),
                high: quote.high.get(i).copied().flatten(),
                low: quote.low.get(i).copied().flatten(),
                close: quote.close.get(i).copied().flatten(),
                volume: quote.volume.get(i).copied().flatten(),
            };

            // Skip rows where all OHLCV are None (holidays/non-trading days)
            if record.is_empty() {
                continue;
            }
            records.push(record);
        }

        Ok(records)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Series, DataError> {
        let symbol = validate_request(symbol, start, end)?;
        let url = Self::chart_url(&symbol, start, end);
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::TransientNetwork(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::NotFound { symbol });
        }
        if !status.is_success() {
            return Err(DataError::TransientNetwork(format!("HTTP {status} for {symbol}")));
        }

        let body = resp
            .text()
            .map_err(|e| DataError::TransientNetwork(format!("failed to read body for {symbol}: {e}")))?;

        let series = Self::parse_chart(&symbol, &body, start, end)?;
        log::info!("fetched {} records for {symbol}", series.len());
        Ok(series)
    }
}
