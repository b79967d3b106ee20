use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use cndc_parser::{
    extract, metric_columns, read_workbook, reshape, reshape_period_column, resolve, LongDataset,
    PeriodDecoder, RawTable,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Layout, MetricFamily, PipelineConfig};
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Parsed,
    Duplicate,
    SchemaMismatch,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub hash: Option<String>,
    pub status: FileStatus,
    pub rows: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileReport {
    fn new(path: &Path, hash: Option<String>, status: FileStatus) -> Self {
        Self {
            path: path.display().to_string(),
            hash,
            status,
            rows: 0,
            missing_fields: Vec::new(),
            message: None,
        }
    }
}

#[derive(Debug)]
pub struct IngestionBatch {
    pub family: String,
    pub dataset: LongDataset,
    pub reports: Vec<FileReport>,
}

impl IngestionBatch {
    pub fn count(&self, status: FileStatus) -> usize {
        self.reports.iter().filter(|r| r.status == status).count()
    }

    /// Reports that need operator attention.
    pub fn problems(&self) -> impl Iterator<Item = &FileReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, FileStatus::SchemaMismatch | FileStatus::Failed))
    }
}

/// Reshapes one release table into the family's long-form dataset.
///
/// Resolved columns are renamed to their field names first, so every release
/// yields the same identifier columns whatever spelling it used.
pub fn reshape_table(
    mut table: RawTable,
    family: &MetricFamily,
    decoder: &PeriodDecoder,
) -> Result<LongDataset> {
    let schema = resolve(table.headers(), &family.required_fields())?;
    schema.apply(&mut table)?;

    let identifiers = family.identifier_columns();
    let dataset = match &family.layout {
        Layout::Wide { metric_fragment } => {
            let narrowed = extract(&table, metric_fragment, &identifiers);
            let metrics = metric_columns(&narrowed, metric_fragment);
            reshape(
                &narrowed,
                &identifiers,
                &metrics,
                &family.value_name,
                decoder,
            )?
        }
        Layout::PeriodColumn {
            period_field,
            value_field,
        } => reshape_period_column(
            &table,
            &identifiers,
            &period_field.name,
            &value_field.name,
            &family.value_name,
            decoder,
        )?,
    };
    Ok(dataset)
}

pub fn ingest_file(
    path: &Path,
    family: &MetricFamily,
    decoder: &PeriodDecoder,
) -> Result<LongDataset> {
    let table = read_workbook(path)?;
    reshape_table(table, family, decoder)
}

/// Ingests every path for one family. A file that cannot be read or whose schema
/// does not resolve contributes no rows and is reported; the batch continues.
pub fn ingest_family(
    paths: &[PathBuf],
    family_name: &str,
    config: &PipelineConfig,
) -> Result<IngestionBatch> {
    let family = config.family(family_name)?;
    let decoder = config.decoder();

    let mut dataset = LongDataset::new(family.identifier_columns(), family.value_name.clone());
    let mut reports = Vec::with_capacity(paths.len());
    let mut seen_hashes = HashSet::new();

    for path in paths {
        let hash = match fs::read(path) {
            Ok(contents) => compute_hash(&contents),
            Err(err) => {
                warn!(file = %path.display(), error = %err, "failed to read file");
                let mut report = FileReport::new(path, None, FileStatus::Failed);
                report.message = Some(err.to_string());
                reports.push(report);
                continue;
            }
        };

        if !seen_hashes.insert(hash.clone()) {
            info!(file = %path.display(), "identical release already ingested");
            reports.push(FileReport::new(path, Some(hash), FileStatus::Duplicate));
            continue;
        }

        match ingest_file(path, family, &decoder) {
            Ok(parsed) => {
                info!(
                    file = %path.display(),
                    family = family_name,
                    rows = parsed.len(),
                    "ingested release"
                );
                let mut report = FileReport::new(path, Some(hash), FileStatus::Parsed);
                report.rows = parsed.len();
                reports.push(report);
                dataset.extend(parsed);
            }
            Err(PipelineError::Schema(unresolved)) => {
                warn!(
                    file = %path.display(),
                    family = family_name,
                    missing = %unresolved.fields.join(", "),
                    "release schema does not match family"
                );
                let mut report = FileReport::new(path, Some(hash), FileStatus::SchemaMismatch);
                report.message = Some(unresolved.to_string());
                report.missing_fields = unresolved.fields;
                reports.push(report);
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "failed to ingest release");
                let mut report = FileReport::new(path, Some(hash), FileStatus::Failed);
                report.message = Some(err.to_string());
                reports.push(report);
            }
        }
    }

    Ok(IngestionBatch {
        family: family_name.to_string(),
        dataset,
        reports,
    })
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
