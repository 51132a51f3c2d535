//! tickerlens runner: run configuration, charts, artifacts and the pipeline.
//!
//! This crate builds on `tickerlens-core` to provide:
//! - Layered run configuration (defaults, TOML, environment)
//! - PNG line charts of closing prices
//! - Atomic persistence of CSV tables, charts and the run manifest
//! - The per-symbol pipeline with progress reporting

pub mod config;
pub mod manifest;
pub mod persist;
pub mod pipeline;
pub mod progress;
pub mod render;

pub use config::{ConfigError, RunConfig, SourceKind};
pub use manifest::{RunManifest, SymbolEntry, SymbolStatus};
pub use persist::{load_csv, save_csv, save_image, PersistError};
pub use pipeline::{process_symbol, run_pipeline, RunSummary, StageError, SymbolOutcome};
pub use progress::{RunProgress, SilentProgress, StdoutProgress};
pub use render::{render, render_combined, ChartStyle, Image, RenderError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: run types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<RunConfig>();
        require_sync::<RunConfig>();
        require_send::<RunSummary>();
        require_send::<StageError>();
        require_sync::<StageError>();
        require_send::<Image>();
    }

    #[test]
    fn errors_display_their_stage() {
        let err: StageError = RenderError::EmptySeries {
            label: "AAPL".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "render failed: nothing to plot for AAPL: no close values"
        );
    }
}
