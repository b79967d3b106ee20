use std::collections::HashSet;

use cndc_parser::{CanonicalPeriod, LongDataset, ParserError};

use crate::error::Result;

/// Inclusive range of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRange {
    pub start: CanonicalPeriod,
    pub end: CanonicalPeriod,
}

impl PeriodRange {
    /// Bounds given in either order are swapped into place.
    pub fn new(start: CanonicalPeriod, end: CanonicalPeriod) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn contains(&self, period: CanonicalPeriod) -> bool {
        self.start <= period && period <= self.end
    }
}

/// Earliest and latest month present, `None` for an empty dataset.
pub fn period_bounds(dataset: &LongDataset) -> Option<PeriodRange> {
    let start = dataset.records.iter().map(|r| r.period).min()?;
    let end = dataset.records.iter().map(|r| r.period).max()?;
    Some(PeriodRange { start, end })
}

pub fn filter_periods(dataset: &LongDataset, range: PeriodRange) -> LongDataset {
    let records = dataset
        .records
        .iter()
        .filter(|record| range.contains(record.period))
        .cloned()
        .collect();
    dataset.with_records(records)
}

/// Rows whose `column` equals `value` exactly.
pub fn filter_entity(dataset: &LongDataset, column: &str, value: &str) -> Result<LongDataset> {
    let idx = column_index(dataset, column)?;
    let records = dataset
        .records
        .iter()
        .filter(|record| record.identifiers[idx] == value)
        .cloned()
        .collect();
    Ok(dataset.with_records(records))
}

/// Distinct values of an identifier column in the order they first appear.
pub fn distinct_values(dataset: &LongDataset, column: &str) -> Result<Vec<String>> {
    let idx = column_index(dataset, column)?;
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for record in &dataset.records {
        let value = &record.identifiers[idx];
        if seen.insert(value.as_str()) {
            values.push(value.clone());
        }
    }
    Ok(values)
}

fn column_index(dataset: &LongDataset, column: &str) -> Result<usize> {
    dataset.identifier_index(column).ok_or_else(|| {
        ParserError::UnknownColumn {
            column: column.to_string(),
        }
        .into()
    })
}
