use tracing::debug;

use crate::errors::ParserError;
use crate::model::{CanonicalPeriod, Cell, LongDataset, LongRecord, RawTable};
use crate::numeric::normalize;
use crate::period::PeriodDecoder;

/// Melts wide metric columns (`"<label> <period token>"`) into long-form records.
///
/// Columns whose period token does not decode are dropped, as are rows with a
/// blank identifier (totals and spacer rows). Output order is row order, then
/// metric-column order.
pub fn reshape(
    table: &RawTable,
    identifier_columns: &[String],
    metric_columns: &[String],
    value_name: &str,
    decoder: &PeriodDecoder,
) -> Result<LongDataset, ParserError> {
    let id_indices = table.column_indices(identifier_columns)?;
    let metric_indices = table.column_indices(metric_columns)?;

    let mut periods = Vec::with_capacity(metric_indices.len());
    for (&idx, name) in metric_indices.iter().zip(metric_columns) {
        match decoder.decode_header(name) {
            Ok(period) => periods.push((idx, period)),
            Err(err) => debug!(column = %name, error = %err, "dropping metric column"),
        }
    }

    let mut dataset = LongDataset::new(identifier_columns.to_vec(), value_name);
    for (row_idx, row) in table.rows().iter().enumerate() {
        let Some(identifiers) = row_identifiers(row, &id_indices) else {
            debug!(row = row_idx + 2, "skipping row with blank identifier");
            continue;
        };
        for &(col_idx, period) in &periods {
            dataset.records.push(LongRecord {
                identifiers: identifiers.clone(),
                period,
                value: normalize(&row[col_idx]),
            });
        }
    }
    Ok(dataset)
}

/// Long-form records from a table that carries its period in a dedicated cell
/// per row (one value column, one period column). Date-typed period cells give
/// their own month; anything else goes through the period decoder.
pub fn reshape_period_column(
    table: &RawTable,
    identifier_columns: &[String],
    period_column: &str,
    value_column: &str,
    value_name: &str,
    decoder: &PeriodDecoder,
) -> Result<LongDataset, ParserError> {
    let id_indices = table.column_indices(identifier_columns)?;
    let period_idx = table
        .column_index(period_column)
        .ok_or_else(|| ParserError::UnknownColumn {
            column: period_column.to_string(),
        })?;
    let value_idx = table
        .column_index(value_column)
        .ok_or_else(|| ParserError::UnknownColumn {
            column: value_column.to_string(),
        })?;

    let mut dataset = LongDataset::new(identifier_columns.to_vec(), value_name);
    for (row_idx, row) in table.rows().iter().enumerate() {
        let Some(identifiers) = row_identifiers(row, &id_indices) else {
            debug!(row = row_idx + 2, "skipping row with blank identifier");
            continue;
        };
        let period = match &row[period_idx] {
            Cell::Date(date) => CanonicalPeriod::containing(*date),
            cell => match decoder.decode(&cell.display_string()) {
                Ok(period) => period,
                Err(err) => {
                    debug!(row = row_idx + 2, error = %err, "skipping row with invalid period");
                    continue;
                }
            },
        };
        dataset.records.push(LongRecord {
            identifiers,
            period,
            value: normalize(&row[value_idx]),
        });
    }
    Ok(dataset)
}

fn row_identifiers(row: &[Cell], indices: &[usize]) -> Option<Vec<String>> {
    indices
        .iter()
        .map(|&idx| {
            let value = row[idx].display_string();
            (!value.is_empty()).then_some(value)
        })
        .collect()
}
