//! Multi-symbol close alignment.
//!
//! Given several series, align their closes to a common calendar. A symbol
//! missing a date carries its last close forward; dates before its first
//! close stay empty.

use crate::domain::Series;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Closes of several symbols on a shared, ascending date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosePanel {
    pub dates: Vec<NaiveDate>,
    /// One column per symbol, in input order. Each has the same length as `dates`.
    pub columns: Vec<(String, Vec<Option<f64>>)>,
}

impl ClosePanel {
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(s, _)| s.as_str())
    }

    pub fn column(&self, symbol: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, c)| c.as_slice())
    }
}

/// Align closes of multiple series to the union of their dates.
pub fn align_closes(series: &[&Series]) -> ClosePanel {
    let all_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.records.iter().map(|r| r.date))
        .collect();
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    let columns = series
        .iter()
        .map(|s| {
            let by_date: HashMap<NaiveDate, Option<f64>> =
                s.records.iter().map(|r| (r.date, r.close)).collect();

            let mut last = None;
            let column = dates
                .iter()
                .map(|date| {
                    if let Some(Some(close)) = by_date.get(date) {
                        last = Some(*close);
                    }
                    last
                })
                .collect();
            (s.symbol.clone(), column)
        })
        .collect();

    ClosePanel { dates, columns }
}
