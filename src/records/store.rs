//! Lookup index over a prior record snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::FileRecord;

/// Read-only index of previously known records, keyed by path.
///
/// Built once per run from the snapshot supplied on input. When the same
/// path appears more than once, the later record wins.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: HashMap<PathBuf, FileRecord>,
}

impl RecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from prior records.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> Self {
        records.into_iter().collect()
    }

    /// Look up the record stored for `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.records.get(path)
    }

    /// Look up a record for `path` whose hash is still valid for a file
    /// of `size` bytes last modified at `mod_time`.
    #[must_use]
    pub fn lookup_fresh(&self, path: &Path, size: u64, mod_time: i64) -> Option<&FileRecord> {
        self.get(path)
            .filter(|record| record.is_fresh_for(size, mod_time))
    }

    /// Number of distinct paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<FileRecord> for RecordStore {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut records = HashMap::new();
        for record in iter {
            if let Some(previous) = records.insert(record.path.clone(), record) {
                log::trace!("Duplicate input record for {}", previous.path.display());
            }
        }
        Self { records }
    }
}
