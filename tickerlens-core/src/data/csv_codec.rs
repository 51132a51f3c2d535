//! Series CSV codec.
//!
//! Layout: header `date,open,high,low,close,volume`, one row per trading day,
//! absent values as empty cells. Floats are written in shortest round-trip
//! form so a written series reads back bit-for-bit.

use crate::domain::{PriceRecord, Series};
use std::io::{Read, Write};

pub const SERIES_HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Write a series as CSV to any writer.
pub fn write_series<W: Write>(writer: W, series: &Series) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(SERIES_HEADER)?;
    for record in &series.records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a series from CSV. Rows are kept in file order.
pub fn read_series<R: Read>(reader: R, symbol: &str) -> Result<Series, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let records = rdr
        .deserialize::<PriceRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Series::new(symbol, records))
}
