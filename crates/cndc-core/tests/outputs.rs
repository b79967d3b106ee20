use std::fs;
use std::path::{Path, PathBuf};

use cndc_core::aggregate::summary_stats;
use cndc_core::ingestion::ingest_family;
use cndc_core::outputs::{write_manifest, write_summary_csv};
use cndc_core::PipelineConfig;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../cndc-parser/tests/data")
        .join(name)
}

#[test]
fn manifest_lists_every_file() {
    let dir = tempdir().expect("tempdir");
    let batch = ingest_family(
        &[fixture("c_iny_0223.xlsx"), fixture("c_iny_0423.xlsx")],
        "energia_generador",
        &PipelineConfig::default(),
    )
    .expect("ingest");

    let path = dir.path().join("manifest.json");
    write_manifest(&batch, &path).expect("write manifest");

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(manifest["family"], "energia_generador");
    assert_eq!(manifest["rows"], 6);
    assert_eq!(manifest["counts"]["parsed"], 1);
    assert_eq!(manifest["counts"]["schema_mismatch"], 1);
    let files = manifest["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1]["status"], "schema_mismatch");
    assert_eq!(files[1]["missing_fields"][0], "CENTRAL");
}

#[test]
fn summary_csv_has_one_row_per_entity() {
    let dir = tempdir().expect("tempdir");
    let batch = ingest_family(
        &[fixture("c_iny_0223.xlsx")],
        "energia_generador",
        &PipelineConfig::default(),
    )
    .expect("ingest");
    let summaries = summary_stats(&batch.dataset, "GENERADOR").unwrap();

    let path = dir.path().join("summary.csv");
    write_summary_csv(&summaries, &path).expect("write summary");

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "entity,periods,min,mean,max,average_share");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("EGSA,2,2000.5,2500.25,"));
}
