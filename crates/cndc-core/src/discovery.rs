use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::config::PipelineConfig;
use crate::error::Result;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Release workbooks in `dir`, sorted by file name.
///
/// Files matching one of `config.exclude` are derived outputs and are skipped.
/// When a legacy `.xls` and a converted `.xlsx` share a stem only the `.xlsx`
/// is returned.
pub fn discover_inputs(dir: &Path, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let excluded = config
        .exclude
        .iter()
        .map(|pattern| Pattern::new(pattern))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(extension) = lowercase_extension(&path) else {
            continue;
        };
        if !SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }
        let name = file_name(&path);
        if excluded.iter().any(|pattern| pattern.matches(&name)) {
            debug!(file = %name, "excluded from ingestion");
            continue;
        }
        if extension == "xls" && path.with_extension("xlsx").is_file() {
            debug!(file = %name, "converted .xlsx present; skipping legacy file");
            continue;
        }
        inputs.push(path);
    }

    inputs.sort();
    Ok(inputs)
}

#[derive(Debug, Default)]
pub struct UnpackReport {
    pub extracted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Expands every `*.zip` release archive in `dir` into `dir` itself.
///
/// Entries are flattened to their file name; existing files are left untouched.
/// An archive that cannot be read is recorded in the report and the rest continue.
pub fn unpack_archives(dir: &Path) -> Result<UnpackReport> {
    let pattern = format!("{}/*.zip", Pattern::escape(&dir.to_string_lossy()));
    let mut archives: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(|entry| entry.ok()).collect();
    archives.sort();

    let mut report = UnpackReport::default();
    for archive in archives {
        match unpack_one(&archive, dir) {
            Ok(mut extracted) => {
                info!(archive = %archive.display(), files = extracted.len(), "unpacked archive");
                report.extracted.append(&mut extracted);
            }
            Err(err) => {
                warn!(archive = %archive.display(), error = %err, "failed to unpack archive");
                report.failed.push((archive, err.to_string()));
            }
        }
    }
    Ok(report)
}

fn unpack_one(archive_path: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = entry
            .enclosed_name()
            .and_then(|path| path.file_name())
            .map(|name| name.to_owned())
        else {
            warn!(entry = entry.name(), "skipping archive entry with unsafe path");
            continue;
        };

        let target = dir.join(name);
        if target.exists() {
            debug!(file = %target.display(), "already extracted");
            continue;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        extracted.push(target);
    }
    Ok(extracted)
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
