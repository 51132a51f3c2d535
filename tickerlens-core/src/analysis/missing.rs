//! Missing-value report.

use crate::domain::{Field, Series};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Index;

/// Count of absent values per field at the time of the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingReport {
    counts: BTreeMap<Field, usize>,
}

impl MissingReport {
    /// Count absent values in every field of a series.
    pub fn of(series: &Series) -> Self {
        let counts = Field::ALL
            .iter()
            .map(|&field| {
                let n = series.records.iter().filter(|r| r.is_missing(field)).count();
                (field, n)
            })
            .collect();
        Self { counts }
    }

    pub fn get(&self, field: Field) -> usize {
        self.counts.get(&field).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    /// `(field, count)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        Field::ALL.iter().map(move |&f| (f, self.get(f)))
    }
}

impl Index<Field> for MissingReport {
    type Output = usize;

    fn index(&self, field: Field) -> &usize {
        const ZERO: usize = 0;
        self.counts.get(&field).unwrap_or(&ZERO)
    }
}
