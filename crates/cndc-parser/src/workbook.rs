use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDate;
use tracing::debug;

use crate::errors::ParserError;
use crate::model::{Cell, RawTable};

/// Reads the first worksheet of an `.xlsx` or legacy `.xls` release.
/// Row 1 is the header row; header text is trimmed.
pub fn read_workbook(path: &Path) -> Result<RawTable, ParserError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| ParserError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ParserError::NoWorksheet {
            path: path.to_path_buf(),
        })?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|source| ParserError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let table = range_to_table(&range).ok_or_else(|| ParserError::EmptySheet {
        path: path.to_path_buf(),
        sheet: sheet.clone(),
    })?;

    debug!(
        path = %path.display(),
        sheet = %sheet,
        columns = table.width(),
        rows = table.height(),
        "read worksheet"
    );
    Ok(table)
}

fn range_to_table(range: &Range<Data>) -> Option<RawTable> {
    let mut rows = range.rows();
    let header_row = rows.next()?;

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, data)| {
            let name = data_to_cell(data).display_string();
            if name.is_empty() {
                format!("column_{idx}")
            } else {
                name
            }
        })
        .collect();

    let body = rows
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect();

    Some(RawTable::new(headers, body))
}

pub(crate) fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DurationIso(s) => text_cell(s),
        Data::DateTimeIso(s) => iso_date(s).map(Cell::Date).unwrap_or_else(|| text_cell(s)),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if !dt.is_duration() => Cell::Date(datetime.date()),
            _ => Cell::Number(dt.as_f64()),
        },
    }
}

fn text_cell(s: &str) -> Cell {
    if s.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

/// Date part of an ISO 8601 date or datetime string.
fn iso_date(s: &str) -> Option<NaiveDate> {
    let date = s.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
