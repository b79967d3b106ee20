use std::cell::Cell;
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use cndc_core::cache::DatasetCache;
use cndc_core::PipelineError;
use tempfile::tempdir;

#[test]
fn reloads_only_when_file_changes() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("c_iny_0223.xlsx");
    fs::write(&path, b"first").unwrap();

    let loads = Cell::new(0);
    let loader = |p: &Path| -> cndc_core::Result<String> {
        loads.set(loads.get() + 1);
        Ok(fs::read_to_string(p)?)
    };

    let mut cache = DatasetCache::new();
    assert_eq!(cache.get_or_load(&path, loader).unwrap(), "first");
    assert_eq!(cache.get_or_load(&path, loader).unwrap(), "first");
    assert_eq!(loads.get(), 1);

    fs::write(&path, b"second").unwrap();
    let later = SystemTime::now() + Duration::from_secs(60);
    File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(later)
        .unwrap();

    assert_eq!(cache.get_or_load(&path, loader).unwrap(), "second");
    assert_eq!(loads.get(), 2);
    assert_eq!(cache.len(), 1);
}

#[test]
fn invalidate_and_clear_force_reload() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("monomicos.xlsx");
    fs::write(&path, b"data").unwrap();

    let loads = Cell::new(0);
    let loader = |_: &Path| -> cndc_core::Result<i32> {
        loads.set(loads.get() + 1);
        Ok(loads.get())
    };

    let mut cache = DatasetCache::new();
    assert_eq!(*cache.get_or_load(&path, loader).unwrap(), 1);
    assert!(cache.invalidate(&path));
    assert!(!cache.invalidate(&path));
    assert_eq!(*cache.get_or_load(&path, loader).unwrap(), 2);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(*cache.get_or_load(&path, loader).unwrap(), 3);
}

#[test]
fn failed_load_is_not_cached() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("c_iny_0323.xlsx");
    fs::write(&path, b"data").unwrap();

    let mut cache: DatasetCache<String> = DatasetCache::new();
    let err = cache
        .get_or_load(&path, |_| Err(PipelineError::Config("boom".to_string())))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert!(cache.is_empty());

    let missing = dir.path().join("absent.xlsx");
    assert!(matches!(
        cache.get_or_load(&missing, |_| Ok(String::new())),
        Err(PipelineError::Io(_))
    ));
}
