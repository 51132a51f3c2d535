//! tickerlens CLI: fetch daily prices, report gaps and statistics, clean,
//! chart and save.
//!
//! With no arguments, runs AAPL, TSLA and MSFT over 2023-01-01..2024-01-31
//! from Yahoo Finance into `./data` and `./plots`. Settings come from
//! defaults, then `--config`, then `TICKERLENS_*` variables, then flags.
//! `--interactive` asks for symbols and dates last, Enter keeps the shown value.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tickerlens_runner::config::{parse_date, parse_symbols};
use tickerlens_runner::{run_pipeline, RunConfig, RunProgress, SilentProgress, SourceKind, StdoutProgress};

#[derive(Parser)]
#[command(
    name = "tickerlens",
    version,
    about = "Fetch, clean, describe and chart daily equity prices"
)]
struct Cli {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated symbols (e.g. AAPL,TSLA,MSFT).
    #[arg(long)]
    symbols: Option<String>,

    /// First date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// Last date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,

    /// Directory for CSV files and the run manifest.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for PNG charts.
    #[arg(long)]
    plots_dir: Option<PathBuf>,

    /// Data source: yahoo, synthetic or csv.
    #[arg(long)]
    source: Option<SourceKind>,

    /// Directory of {SYMBOL}.csv files for the csv source.
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Prompt for symbols and the date range before running.
    #[arg(long, short, default_value_t = false)]
    interactive: bool,

    /// Only report failures.
    #[arg(long, short, default_value_t = false)]
    quiet: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match build_config(&cli).and_then(|config| run(&cli, &config)) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Returns whether every symbol and the combined step succeeded.
fn run(cli: &Cli, config: &RunConfig) -> Result<bool> {
    let provider = config.provider().context("failed to set up data source")?;

    let progress: &dyn RunProgress = if cli.quiet {
        &SilentProgress
    } else {
        &StdoutProgress
    };
    let summary = run_pipeline(config, provider.as_ref(), progress);

    if cli.quiet {
        for outcome in summary.outcomes.iter().filter(|o| !o.succeeded()) {
            for e in &outcome.errors {
                eprintln!("FAIL: {}: {e}", outcome.symbol);
            }
        }
        for e in &summary.errors {
            eprintln!("FAIL: {e}");
        }
    } else {
        println!(
            "Data saved to '{}', charts to '{}'.",
            config.data_dir.display(),
            config.plots_dir.display()
        );
    }

    Ok(summary.all_succeeded())
}

fn build_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = build_config_with(cli, |key| std::env::var(key).ok())?;
    if cli.interactive {
        prompt_overrides(&mut config, &mut io::stdin().lock(), &mut io::stdout())?;
        config.validate()?;
    }
    log::debug!("resolved config: {config:?}");
    Ok(config)
}

/// Layer the config file, `lookup` as the environment and the flags.
fn build_config_with<F>(cli: &Cli, lookup: F) -> Result<RunConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    config.apply_env(lookup)?;

    if let Some(symbols) = &cli.symbols {
        config.symbols = parse_symbols(symbols);
    }
    if let Some(start) = &cli.start {
        config.start = parse_date("--start", start)?;
    }
    if let Some(end) = &cli.end {
        config.end = parse_date("--end", end)?;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.plots_dir {
        config.plots_dir = dir.clone();
    }
    if let Some(source) = cli.source {
        config.source = source;
    }
    if let Some(dir) = &cli.input_dir {
        config.input_dir = Some(dir.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Ask for symbols, start and end. A blank answer or end of input keeps the
/// current value.
fn prompt_overrides(config: &mut RunConfig, input: &mut impl BufRead, output: &mut impl Write) -> Result<()> {
    let symbols = config.symbols.join(",");
    if let Some(answer) = ask(input, output, "Tickers (comma separated)", &symbols)? {
        config.symbols = parse_symbols(&answer);
    }
    if let Some(answer) = ask(input, output, "Start date (YYYY-MM-DD)", &config.start.to_string())? {
        config.start = parse_date("start", &answer)?;
    }
    if let Some(answer) = ask(input, output, "End date (YYYY-MM-DD)", &config.end.to_string())? {
        config.end = parse_date("end", &answer)?;
    }
    Ok(())
}

fn ask(input: &mut impl BufRead, output: &mut impl Write, label: &str, current: &str) -> Result<Option<String>> {
    write!(output, "{label} [{current}]: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read answer")?;
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}
