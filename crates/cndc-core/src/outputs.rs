use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::aggregate::EntitySummary;
use crate::error::Result;
use crate::ingestion::{FileReport, FileStatus, IngestionBatch};

#[derive(Debug, Serialize)]
struct StatusCounts {
    parsed: usize,
    duplicate: usize,
    schema_mismatch: usize,
    failed: usize,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    generated_at: String,
    family: &'a str,
    rows: usize,
    counts: StatusCounts,
    files: &'a [FileReport],
}

/// Writes one CSV row per entity summary, header included.
pub fn write_summary_csv(summaries: &[EntitySummary], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for summary in summaries {
        writer.serialize(summary)?;
    }
    writer.flush()?;
    info!(output = %path.display(), entities = summaries.len(), "wrote summary table");
    Ok(())
}

/// Records what happened to every input file of a batch.
pub fn write_manifest(batch: &IngestionBatch, path: &Path) -> Result<()> {
    let manifest = Manifest {
        generated_at: Utc::now().to_rfc3339(),
        family: &batch.family,
        rows: batch.dataset.len(),
        counts: StatusCounts {
            parsed: batch.count(FileStatus::Parsed),
            duplicate: batch.count(FileStatus::Duplicate),
            schema_mismatch: batch.count(FileStatus::SchemaMismatch),
            failed: batch.count(FileStatus::Failed),
        },
        files: &batch.reports,
    };

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &manifest)?;
    info!(output = %path.display(), files = batch.reports.len(), "wrote ingestion manifest");
    Ok(())
}
