use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to read a release workbook into a [`RawTable`](crate::RawTable).
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("failed to open workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {} has no worksheets", .path.display())]
    NoWorksheet { path: PathBuf },

    #[error("worksheet '{sheet}' in {} is empty", .path.display())]
    EmptySheet { path: PathBuf, sheet: String },

    #[error("column '{column}' is not present in the table")]
    UnknownColumn { column: String },
}

/// Schema-level failure: one or more semantic fields had no matching header.
///
/// Carries every missing field so the operator sees all problems of a release at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unresolved fields: {}", .fields.join(", "))]
pub struct UnresolvedFields {
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPeriodReason {
    Length,
    NonDigit,
    Month,
    Year,
}

impl fmt::Display for InvalidPeriodReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidPeriodReason::Length => f.write_str("expected 4, 5 or 6 digits"),
            InvalidPeriodReason::NonDigit => f.write_str("contains non-digit characters"),
            InvalidPeriodReason::Month => f.write_str("month outside 1-12"),
            InvalidPeriodReason::Year => f.write_str("year out of range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid period code '{code}': {reason}")]
pub struct InvalidPeriod {
    pub code: String,
    pub reason: InvalidPeriodReason,
}

impl InvalidPeriod {
    pub(crate) fn new(code: &str, reason: InvalidPeriodReason) -> Self {
        Self {
            code: code.to_string(),
            reason,
        }
    }
}
