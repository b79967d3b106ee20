use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ParserError;

/// Name of the period column in the long-form output.
pub const PERIOD_COLUMN: &str = "FECHA";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// A cell the workbook stores as a calendar date.
    Date(NaiveDate),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Renders the cell as the string an operator would see in the sheet.
    /// Whole numbers drop their fractional part so numeric period cells such as
    /// `12023.0` read back as `12023`.
    pub fn display_string(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.trim().to_string(),
            Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
            Cell::Number(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// A worksheet as read from disk: row 1 supplies the headers, every following
/// row is kept verbatim. Rows shorter than the header are padded with `Empty`.
///
/// Header names are unique: a repeated header gets a `.1`, `.2`, ... suffix, so
/// a repeated metric column no longer carries a decodable period token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let headers = dedupe_headers(headers);
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn column_indices(&self, names: &[String]) -> Result<Vec<usize>, ParserError> {
        names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| ParserError::UnknownColumn {
                        column: name.clone(),
                    })
            })
            .collect()
    }

    /// Keeps the columns at `indices`, in the given order.
    pub fn select_indices(&self, indices: &[usize]) -> RawTable {
        let headers = indices.iter().map(|&idx| self.headers[idx].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&idx| row[idx].clone()).collect())
            .collect();
        RawTable { headers, rows }
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), ParserError> {
        let idx = self
            .column_index(from)
            .ok_or_else(|| ParserError::UnknownColumn {
                column: from.to_string(),
            })?;
        self.headers[idx] = to.to_string();
        Ok(())
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .map(|header| {
            if seen.insert(header.trim().to_string()) {
                return header;
            }
            let base = header.trim();
            let mut suffix = 1;
            loop {
                let candidate = format!("{base}.{suffix}");
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
                suffix += 1;
            }
        })
        .collect()
}

/// First day of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalPeriod(NaiveDate);

impl CanonicalPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Truncates any date to the first of its month.
    pub fn containing(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn next(&self) -> Option<Self> {
        let (year, month) = if self.month() == 12 {
            (self.year() + 1, 1)
        } else {
            (self.year(), self.month() + 1)
        };
        Self::new(year, month)
    }
}

impl fmt::Display for CanonicalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// One row of the canonical dataset. `identifiers` is positional and lines up
/// with [`LongDataset::identifier_columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub identifiers: Vec<String>,
    pub period: CanonicalPeriod,
    pub value: Option<f64>,
}

/// Long-form dataset shared with the presentation layer:
/// `{identifier columns..., FECHA, <value_name>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct LongDataset {
    pub identifier_columns: Vec<String>,
    pub value_name: String,
    pub records: Vec<LongRecord>,
}

impl LongDataset {
    pub fn new(identifier_columns: Vec<String>, value_name: impl Into<String>) -> Self {
        Self {
            identifier_columns,
            value_name: value_name.into(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn identifier_index(&self, column: &str) -> Option<usize> {
        self.identifier_columns.iter().position(|c| c == column)
    }

    /// Same columns, different rows.
    pub fn with_records(&self, records: Vec<LongRecord>) -> Self {
        Self {
            identifier_columns: self.identifier_columns.clone(),
            value_name: self.value_name.clone(),
            records,
        }
    }

    pub fn extend(&mut self, other: LongDataset) {
        self.records.extend(other.records);
    }
}
