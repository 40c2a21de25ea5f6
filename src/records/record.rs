//! The file record exchanged at the program boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One scanned file.
///
/// Field names are the wire format: a scan writes a JSON array of these to
/// stdout and the next run reads the same array back as its prior snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path of the file as produced by the walk.
    pub path: PathBuf,
    /// Byte length at scan time.
    pub size: u64,
    /// 16 lowercase hex characters, or empty when never hashed.
    #[serde(default)]
    pub hash: String,
    /// Last modification time, unix seconds.
    pub mod_time: i64,
    /// When `hash` was computed, unix seconds.
    #[serde(default)]
    pub hash_time: i64,
}

impl FileRecord {
    /// Create a record that has not been hashed yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64, mod_time: i64) -> Self {
        Self {
            path: path.into(),
            size,
            hash: String::new(),
            mod_time,
            hash_time: 0,
        }
    }

    /// Attach a hash and the time it was computed.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>, hash_time: i64) -> Self {
        self.hash = hash.into();
        self.hash_time = hash_time;
        self
    }

    /// Whether a hash has been recorded.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        !self.hash.is_empty()
    }

    /// Whether the stored hash can stand in for a file that currently has
    /// `size` bytes and was last modified at `mod_time`.
    ///
    /// The hash must have been taken strictly after the last modification
    /// and the size must not have changed.
    #[must_use]
    pub fn is_fresh_for(&self, size: u64, mod_time: i64) -> bool {
        self.is_hashed() && self.hash_time > mod_time && self.size == size
    }

    /// Borrow the path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Convert a filesystem timestamp to unix seconds.
///
/// Times before the epoch come out negative rather than failing.
#[must_use]
pub fn unix_seconds(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}

/// Current wall-clock time in unix seconds.
#[must_use]
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}
