//! Artifact persistence: CSV tables, PNG charts and the run manifest.
//!
//! Every write goes to `<file>.tmp` first and is renamed into place, so a
//! failed run never leaves a truncated artifact behind. Parent directories
//! are created on demand.

use crate::manifest::RunManifest;
use crate::render::Image;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tickerlens_core::analysis::{FieldStats, MissingReport, SummaryStats, STAT_LABELS};
use tickerlens_core::data::{read_series, write_series, ClosePanel};
use tickerlens_core::domain::{Field, Series};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error at {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_err(path: &Path, source: std::io::Error) -> PersistError {
    PersistError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_err(path: &Path, source: csv::Error) -> PersistError {
    PersistError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

// ─── Series ─────────────────────────────────────────────────────────

/// Write a series as `date,open,high,low,close,volume` rows.
pub fn save_csv(series: &Series, path: &Path) -> Result<(), PersistError> {
    write_atomic(path, |w| write_series(w, series).map_err(|e| csv_err(path, e)))
}

/// Read a series written by [`save_csv`].
pub fn load_csv(path: &Path, symbol: &str) -> Result<Series, PersistError> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    read_series(file, symbol).map_err(|e| csv_err(path, e))
}

// ─── Charts ─────────────────────────────────────────────────────────

pub fn save_image(image: &Image, path: &Path) -> Result<(), PersistError> {
    write_atomic(path, |w| w.write_all(&image.png).map_err(|e| io_err(path, e)))
}

// ─── Report tables ──────────────────────────────────────────────────

/// Describe-style table of one symbol: a row per field, a column per statistic.
pub fn save_summary_csv(stats: &SummaryStats, path: &Path) -> Result<(), PersistError> {
    write_table(path, |wtr| {
        let mut header = vec!["field".to_string()];
        header.extend(STAT_LABELS.iter().map(|s| s.to_string()));
        wtr.write_record(&header)?;
        for (field, s) in stats.iter() {
            wtr.write_record(stat_row(field.name(), &s))?;
        }
        Ok(())
    })
}

/// Absent-value counts per symbol and field.
pub fn save_missing_csv(
    reports: &[(&str, &MissingReport)],
    path: &Path,
) -> Result<(), PersistError> {
    write_table(path, |wtr| {
        let mut header = vec!["symbol".to_string()];
        header.extend(Field::ALL.iter().map(|f| f.name().to_string()));
        header.push("total".into());
        wtr.write_record(&header)?;
        for (symbol, report) in reports {
            let mut row = vec![symbol.to_string()];
            row.extend(report.iter().map(|(_, n)| n.to_string()));
            row.push(report.total().to_string());
            wtr.write_record(&row)?;
        }
        Ok(())
    })
}

/// Close-price statistics, one row per symbol.
pub fn save_close_summary_csv(
    rows: &[(&str, FieldStats)],
    path: &Path,
) -> Result<(), PersistError> {
    write_table(path, |wtr| {
        let mut header = vec!["symbol".to_string()];
        header.extend(STAT_LABELS.iter().map(|s| s.to_string()));
        wtr.write_record(&header)?;
        for (symbol, s) in rows {
            wtr.write_record(stat_row(symbol, s))?;
        }
        Ok(())
    })
}

/// Wide table of aligned closes: `date,SYM1,SYM2,...`. Gaps are empty cells.
pub fn save_panel_csv(panel: &ClosePanel, path: &Path) -> Result<(), PersistError> {
    write_table(path, |wtr| {
        let mut header = vec!["date".to_string()];
        header.extend(panel.symbols().map(str::to_string));
        wtr.write_record(&header)?;
        for (i, date) in panel.dates.iter().enumerate() {
            let mut row = vec![date.to_string()];
            row.extend(panel.columns.iter().map(|(_, values)| {
                values
                    .get(i)
                    .copied()
                    .flatten()
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            }));
            wtr.write_record(&row)?;
        }
        Ok(())
    })
}

fn stat_row(label: &str, stats: &FieldStats) -> Vec<String> {
    let mut row = vec![label.to_string(), stats.count.to_string()];
    row.extend(
        stats.row()[1..]
            .iter()
            .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
    );
    row
}

// ─── Manifest ───────────────────────────────────────────────────────

pub fn save_manifest(manifest: &RunManifest, path: &Path) -> Result<(), PersistError> {
    write_atomic(path, |w| {
        serde_json::to_writer_pretty(&mut *w, manifest).map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        w.write_all(b"\n").map_err(|e| io_err(path, e))
    })
}

pub fn load_manifest(path: &Path) -> Result<RunManifest, PersistError> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })
}

// ─── Atomic writes ──────────────────────────────────────────────────

fn write_table<F>(path: &Path, fill: F) -> Result<(), PersistError>
where
    F: FnOnce(&mut csv::Writer<&mut BufWriter<File>>) -> Result<(), csv::Error>,
{
    write_atomic(path, |w| {
        let mut wtr = csv::Writer::from_writer(w);
        fill(&mut wtr).map_err(|e| csv_err(path, e))?;
        wtr.flush().map_err(|e| io_err(path, e))
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic<F>(path: &Path, write: F) -> Result<(), PersistError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), PersistError>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = tmp_path(path);
    if let Err(e) = write_tmp(&tmp, write) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        io_err(path, e)
    })?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

fn write_tmp<F>(tmp: &Path, write: F) -> Result<(), PersistError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), PersistError>,
{
    let file = File::create(tmp).map_err(|e| io_err(tmp, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer.flush().map_err(|e| io_err(tmp, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| io_err(tmp, e))
}
