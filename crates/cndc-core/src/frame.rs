use std::fs::File;
use std::path::Path;

use chrono::Datelike;
use cndc_parser::{LongDataset, PERIOD_COLUMN};
use polars::io::parquet::write::{ParquetCompression, ParquetWriter};
use polars::prelude::{Column, CsvWriter, DataFrame, DataType, NamedFrom, SerWriter, Series};
use tracing::info;

use crate::error::{PipelineError, Result};

/// 1970-01-01 counted from 0001-01-01 (CE).
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Builds the presentation frame `{identifiers..., FECHA, <value_name>}`.
/// `FECHA` is a `Date` column; missing values stay null.
pub fn to_dataframe(dataset: &LongDataset) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(dataset.identifier_columns.len() + 2);

    for (idx, name) in dataset.identifier_columns.iter().enumerate() {
        let values: Vec<&str> = dataset
            .records
            .iter()
            .map(|record| record.identifiers[idx].as_str())
            .collect();
        columns.push(Column::from(Series::new(name.as_str().into(), values)));
    }

    let days: Vec<i32> = dataset
        .records
        .iter()
        .map(|record| record.period.date().num_days_from_ce() - EPOCH_DAYS_FROM_CE)
        .collect();
    let periods = Series::new(PERIOD_COLUMN.into(), days).cast(&DataType::Date)?;
    columns.push(Column::from(periods));

    let values: Vec<Option<f64>> = dataset.records.iter().map(|record| record.value).collect();
    columns.push(Column::from(Series::new(
        dataset.value_name.as_str().into(),
        values,
    )));

    Ok(DataFrame::new(columns)?)
}

/// Writes the dataset as parquet (`.parquet`) or CSV (`.csv`).
pub fn write_dataset(dataset: &LongDataset, path: &Path) -> Result<()> {
    let mut df = to_dataframe(dataset)?;
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "parquet" => {
            ParquetWriter::new(File::create(path)?)
                .with_compression(ParquetCompression::Zstd(None))
                .finish(&mut df)?;
        }
        "csv" => {
            CsvWriter::new(File::create(path)?)
                .include_header(true)
                .finish(&mut df)?;
        }
        other => {
            return Err(PipelineError::Config(format!(
                "unsupported output extension '{other}' for {} (expected .parquet or .csv)",
                path.display()
            )))
        }
    }

    info!(output = %path.display(), rows = df.height(), "wrote dataset");
    Ok(())
}
