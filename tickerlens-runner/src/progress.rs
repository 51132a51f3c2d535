//! Progress callbacks for multi-symbol runs.

use crate::pipeline::{RunSummary, SymbolOutcome};
use tickerlens_core::analysis::MissingReport;
use tickerlens_core::domain::{Field, PriceRecord};

pub trait RunProgress: Send {
    /// Called before a symbol is fetched.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called once a symbol has gone through every stage it could reach.
    fn on_complete(&self, outcome: &SymbolOutcome, index: usize, total: usize);

    /// Called after the cross-symbol artifacts and manifest are written.
    fn on_batch_complete(&self, summary: &RunSummary);
}

/// Prints one line per stage to stdout, failures to stderr.
pub struct StdoutProgress;

impl RunProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(&self, outcome: &SymbolOutcome, _index: usize, _total: usize) {
        let symbol = &outcome.symbol;
        if let Some(analysis) = &outcome.analysis {
            println!(
                "  {symbol}: {} records, {} missing values, {} after cleaning",
                outcome.records_fetched,
                analysis.missing.total(),
                analysis.cleaned.len()
            );
            for line in preview_lines(&outcome.preview) {
                println!("    {line}");
            }
            println!("  missing: {}", missing_line(&analysis.missing));
            let close = analysis.stats.get(Field::Close);
            println!(
                "  close: mean {}  std {}  min {}  median {}  max {}",
                fmt_stat(close.mean),
                fmt_stat(close.std),
                fmt_stat(close.min),
                fmt_stat(close.median),
                fmt_stat(close.max)
            );
        }
        if outcome.errors.is_empty() {
            println!("  OK: {symbol} ({} files)", outcome.artifacts.len());
        }
        for e in &outcome.errors {
            eprintln!("  FAIL: {symbol}: {e}");
        }
    }

    fn on_batch_complete(&self, summary: &RunSummary) {
        for e in &summary.errors {
            eprintln!("  FAIL: {e}");
        }
        println!(
            "\nRun complete: {}/{} symbols succeeded, {} failed",
            summary.succeeded(),
            summary.outcomes.len(),
            summary.failed()
        );
    }
}

/// Reports nothing.
pub struct SilentProgress;

impl RunProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _outcome: &SymbolOutcome, _index: usize, _total: usize) {}
    fn on_batch_complete(&self, _summary: &RunSummary) {}
}

fn fmt_stat(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.2}")
    } else {
        "n/a".into()
    }
}

/// Header plus one row per record, absent values shown as `NaN`.
pub fn preview_lines(records: &[PriceRecord]) -> Vec<String> {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(format!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "date", "open", "high", "low", "close", "volume"
    ));
    for r in records {
        lines.push(format!(
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
            r.date.to_string(),
            fmt_cell(r.open),
            fmt_cell(r.high),
            fmt_cell(r.low),
            fmt_cell(r.close),
            r.volume.map_or_else(|| "NaN".to_string(), |v| v.to_string())
        ));
    }
    lines
}

/// Per-field missing counts, e.g. `open 0, high 0, low 0, close 1, volume 0`.
pub fn missing_line(report: &MissingReport) -> String {
    report
        .iter()
        .map(|(field, n)| format!("{field} {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"))
}
