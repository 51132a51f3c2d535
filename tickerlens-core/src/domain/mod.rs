//! Domain types for tickerlens

pub mod record;
pub mod series;

pub use record::{Field, PriceRecord};
pub use series::Series;
