use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::Result;

struct Entry<T> {
    modified: SystemTime,
    value: T,
}

/// Loaded values keyed by source file, reloaded when the file's modification
/// time changes.
pub struct DatasetCache<T> {
    entries: HashMap<PathBuf, Entry<T>>,
}

impl<T> Default for DatasetCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> DatasetCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached value for `path`, calling `loader` when nothing is
    /// cached yet or the file changed since it was loaded. A failed load leaves
    /// any previous entry in place.
    pub fn get_or_load<F>(&mut self, path: &Path, loader: F) -> Result<&T>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let modified = fs::metadata(path)?.modified()?;
        match self.entries.entry(path.to_path_buf()) {
            MapEntry::Occupied(mut occupied) => {
                if occupied.get().modified != modified {
                    debug!(file = %path.display(), "source changed; reloading");
                    let value = loader(path)?;
                    occupied.insert(Entry { modified, value });
                }
                Ok(&occupied.into_mut().value)
            }
            MapEntry::Vacant(vacant) => {
                debug!(file = %path.display(), "loading into cache");
                let value = loader(path)?;
                Ok(&vacant.insert(Entry { modified, value }).value)
            }
        }
    }

    /// Drops the entry for `path`; returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
