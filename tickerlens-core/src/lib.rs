//! tickerlens core: price series types, acquisition and analysis.
//!
//! This crate contains everything that does not touch charts or the output
//! folders:
//! - Domain types (price records, series, fields)
//! - Data providers (Yahoo Finance chart API, CSV directory, synthetic walk)
//! - The series CSV codec
//! - Missing-value report, cleaning policy and summary statistics
//! - Close alignment across symbols

pub mod analysis;
pub mod data;
pub mod domain;

pub use analysis::{analyze, Analysis, FieldStats, MissingReport, SummaryStats};
pub use data::{DataError, DataProvider, DataSource};
pub use domain::{Field, PriceRecord, Series};
