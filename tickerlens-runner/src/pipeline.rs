//! The per-symbol pipeline and the run that drives it.
//!
//! For every symbol: fetch, report missing values and statistics, clean,
//! chart, then persist raw data, cleaned data, the summary table and the
//! chart. A failure in one symbol is recorded and the run moves on. Once all
//! symbols are done, the cross-symbol tables, the combined chart and the
//! manifest are written from whatever succeeded.

use crate::config::RunConfig;
use crate::manifest::{series_hash, RunManifest, SymbolEntry, SymbolStatus};
use crate::persist::{
    save_close_summary_csv, save_csv, save_image, save_manifest, save_missing_csv,
    save_panel_csv, save_summary_csv, PersistError,
};
use crate::progress::RunProgress;
use crate::render::{render, render_combined, Image, RenderError};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tickerlens_core::analysis::{analyze, Analysis};
use tickerlens_core::data::{align_closes, DataError, DataProvider};
use tickerlens_core::domain::{Field, PriceRecord, Series};

pub const MISSING_VALUES_FILE: &str = "missing_values.csv";
pub const SUMMARY_STATS_FILE: &str = "summary_stats.csv";
pub const CLOSING_PRICES_FILE: &str = "closing_prices_cleaned.csv";
pub const COMBINED_CHART_FILE: &str = "combined_closing_prices.png";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Number of fetched records kept on each outcome for console previews.
pub const PREVIEW_ROWS: usize = 5;

/// A failure in one stage of the pipeline.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] DataError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("persist failed: {0}")]
    Persist(#[from] PersistError),
}

/// What happened to one symbol.
#[derive(Debug)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub records_fetched: usize,
    /// The first fetched records, at most [`PREVIEW_ROWS`]
    pub preview: Vec<PriceRecord>,
    /// Present once the fetch succeeded
    pub analysis: Option<Analysis>,
    /// Files written for this symbol, in write order
    pub artifacts: Vec<PathBuf>,
    pub errors: Vec<StageError>,
}

impl SymbolOutcome {
    fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            records_fetched: 0,
            preview: Vec::new(),
            analysis: None,
            artifacts: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.analysis.is_some() && self.errors.is_empty()
    }

    pub fn status(&self) -> SymbolStatus {
        match (&self.analysis, self.errors.is_empty()) {
            (None, _) => SymbolStatus::Failed,
            (Some(_), true) => SymbolStatus::Ok,
            (Some(_), false) => SymbolStatus::Partial,
        }
    }

    fn manifest_entry(&self) -> SymbolEntry {
        let analysis = self.analysis.as_ref();
        SymbolEntry {
            symbol: self.symbol.clone(),
            status: self.status(),
            records_fetched: self.records_fetched,
            records_cleaned: analysis.map_or(0, |a| a.cleaned.len()),
            missing_values: analysis.map_or(0, |a| a.missing.total()),
            data_hash: analysis.map(|a| series_hash(&a.cleaned)),
            artifacts: self.artifacts.clone(),
            errors: self.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Result of a whole run.
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<SymbolOutcome>,
    /// Cross-symbol files written
    pub artifacts: Vec<PathBuf>,
    /// Cross-symbol failures
    pub errors: Vec<StageError>,
    pub manifest: RunManifest,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// True when every symbol and every cross-symbol step succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0 && self.errors.is_empty()
    }

    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes.iter().find(|o| o.symbol == symbol)
    }
}

/// Run every configured symbol through the pipeline.
pub fn run_pipeline(
    config: &RunConfig,
    provider: &dyn DataProvider,
    progress: &dyn RunProgress,
) -> RunSummary {
    let total = config.symbols.len();
    log::info!(
        "running {total} symbols from {} via {} ({} to {})",
        provider.name(),
        config.source,
        config.start,
        config.end
    );

    let mut outcomes = Vec::with_capacity(total);
    for (i, symbol) in config.symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);
        let outcome = process_symbol(config, provider, symbol);
        progress.on_complete(&outcome, i, total);
        outcomes.push(outcome);
    }

    let mut artifacts = Vec::new();
    let mut errors = Vec::new();
    write_cross_symbol(config, &outcomes, &mut artifacts, &mut errors);

    let mut manifest = RunManifest::new(provider.source(), config.start, config.end);
    manifest.symbols = outcomes.iter().map(SymbolOutcome::manifest_entry).collect();
    manifest.artifacts = artifacts.clone();
    manifest.errors = errors.iter().map(ToString::to_string).collect();

    let manifest_path = config.data_dir.join(MANIFEST_FILE);
    match save_manifest(&manifest, &manifest_path) {
        Ok(()) => artifacts.push(manifest_path),
        Err(e) => {
            log::warn!("manifest not written: {e}");
            errors.push(e.into());
        }
    }

    let summary = RunSummary {
        outcomes,
        artifacts,
        errors,
        manifest,
    };
    log::info!(
        "run complete: {} succeeded, {} failed",
        summary.succeeded(),
        summary.failed()
    );
    progress.on_batch_complete(&summary);
    summary
}

/// Fetch, analyze, chart and persist one symbol.
pub fn process_symbol(config: &RunConfig, provider: &dyn DataProvider, symbol: &str) -> SymbolOutcome {
    let mut outcome = SymbolOutcome::new(symbol);

    let series = match provider.fetch(symbol, config.start, config.end) {
        Ok(series) => series,
        Err(e) => {
            log::warn!("{symbol}: {e}");
            outcome.errors.push(e.into());
            return outcome;
        }
    };
    outcome.symbol = series.symbol.clone();
    outcome.records_fetched = series.len();
    outcome.preview = series.records.iter().take(PREVIEW_ROWS).cloned().collect();

    let analysis = analyze(&series);

    // Charted from the fetched closes; a missing chart must not stop the
    // CSVs from being written.
    let chart = match render(&series, &series.symbol, &config.chart) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("{}: {e}", series.symbol);
            outcome.errors.push(e.into());
            None
        }
    };

    if let Err(e) = persist_symbol(config, &series, &analysis, chart.as_ref(), &mut outcome.artifacts) {
        log::warn!("{}: {e}", series.symbol);
        outcome.errors.push(e.into());
    }

    outcome.analysis = Some(analysis);
    outcome
}

fn persist_symbol(
    config: &RunConfig,
    raw: &Series,
    analysis: &Analysis,
    chart: Option<&Image>,
    written: &mut Vec<PathBuf>,
) -> Result<(), PersistError> {
    let symbol = &raw.symbol;

    let path = config.data_dir.join(format!("{symbol}_raw.csv"));
    save_csv(raw, &path)?;
    written.push(path);

    let path = config.data_dir.join(format!("{symbol}_cleaned.csv"));
    save_csv(&analysis.cleaned, &path)?;
    written.push(path);

    let path = config.data_dir.join(format!("{symbol}_summary.csv"));
    save_summary_csv(&analysis.stats, &path)?;
    written.push(path);

    if let Some(image) = chart {
        let path = config.plots_dir.join(format!("{symbol}_closing_price.png"));
        save_image(image, &path)?;
        written.push(path);
    }
    Ok(())
}

fn write_cross_symbol(
    config: &RunConfig,
    outcomes: &[SymbolOutcome],
    written: &mut Vec<PathBuf>,
    errors: &mut Vec<StageError>,
) {
    let analyzed: Vec<(&str, &Analysis)> = outcomes
        .iter()
        .filter_map(|o| o.analysis.as_ref().map(|a| (o.symbol.as_str(), a)))
        .collect();
    if analyzed.is_empty() {
        log::warn!("no symbol was fetched; skipping cross-symbol artifacts");
        return;
    }

    let mut record = |result: Result<PathBuf, StageError>| match result {
        Ok(path) => written.push(path),
        Err(e) => {
            log::warn!("{e}");
            errors.push(e);
        }
    };

    let path = config.data_dir.join(MISSING_VALUES_FILE);
    let reports: Vec<_> = analyzed.iter().map(|(s, a)| (*s, &a.missing)).collect();
    record(save_missing_csv(&reports, &path).map(|()| path).map_err(Into::into));

    let path = config.data_dir.join(SUMMARY_STATS_FILE);
    let closes: Vec<_> = analyzed
        .iter()
        .map(|(s, a)| (*s, a.stats.get(Field::Close)))
        .collect();
    record(save_close_summary_csv(&closes, &path).map(|()| path).map_err(Into::into));

    let cleaned: Vec<&Series> = analyzed.iter().map(|(_, a)| &a.cleaned).collect();
    let path = config.data_dir.join(CLOSING_PRICES_FILE);
    record(save_panel_csv(&align_closes(&cleaned), &path).map(|()| path).map_err(Into::into));

    let by_label: BTreeMap<&str, &Series> = analyzed.iter().map(|(s, a)| (*s, &a.cleaned)).collect();
    let path = config.plots_dir.join(COMBINED_CHART_FILE);
    record(
        render_combined(&by_label, &config.chart)
            .map_err(StageError::from)
            .and_then(|image| save_image(&image, &path).map_err(StageError::from))
            .map(|()| path),
    );
}
