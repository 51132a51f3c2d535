//! Data acquisition and CSV encoding

pub mod align;
pub mod csv_codec;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use align::{align_closes, ClosePanel};
pub use csv_codec::{read_series, write_series, SERIES_HEADER};
pub use csv_import::CsvProvider;
pub use provider::{DataError, DataProvider, DataSource};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
