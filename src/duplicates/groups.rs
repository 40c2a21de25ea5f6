//! Hash-based duplicate grouping.
//!
//! # Overview
//!
//! [`group_by_hash`] partitions a record set by content hash. Records at or
//! below the size threshold, and records that were never hashed, take no
//! part. Only hashes shared by two or more records become a
//! [`DuplicateGroup`].
//!
//! Members keep their input order. Groups are sorted by the path of their
//! first member so that the same records always produce the same output.
//!
//! # Example
//!
//! ```
//! use hashdupe::duplicates::group_by_hash;
//! use hashdupe::records::FileRecord;
//!
//! let records = vec![
//!     FileRecord::new("/a.txt", 100, 1).with_hash("00000000000000aa", 2),
//!     FileRecord::new("/b.txt", 100, 1).with_hash("00000000000000aa", 2),
//!     FileRecord::new("/c.txt", 100, 1).with_hash("00000000000000bb", 2),
//! ];
//!
//! let (groups, stats) = group_by_hash(records, 0);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].len(), 2);
//! assert_eq!(stats.duplicate_files, 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::records::FileRecord;

/// Records sharing one content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Shared content hash (16 hex characters)
    pub hash: String,
    /// File size in bytes, taken from the first member
    pub size: u64,
    /// Members in input order
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: impl Into<String>, files: Vec<FileRecord>) -> Self {
        let size = files.first().map_or(0, |f| f.size);
        Self {
            hash: hash.into(),
            size,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 kept).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes freed by removing every copy but one.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from the grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of records supplied
    pub total_records: usize,
    /// Records at or below the size threshold
    pub below_threshold: usize,
    /// Records above the threshold with no hash
    pub unhashed: usize,
    /// Distinct hashes among eligible records
    pub unique_hashes: usize,
    /// Number of groups with 2+ records
    pub duplicate_groups: usize,
    /// Records that are surplus copies, Σ(|group| − 1)
    pub duplicate_files: usize,
    /// Bytes held by surplus copies
    pub reclaimable_space: u64,
}

/// Group records by content hash.
///
/// # Arguments
///
/// * `records` - Records to partition
/// * `min_size` - Records of this many bytes or fewer are ignored
///
/// # Returns
///
/// Groups with two or more members, sorted by first member path, and
/// statistics about the pass.
#[must_use]
pub fn group_by_hash(
    records: impl IntoIterator<Item = FileRecord>,
    min_size: u64,
) -> (Vec<DuplicateGroup>, GroupingStats) {
    let mut by_hash: HashMap<String, Vec<FileRecord>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for record in records {
        stats.total_records += 1;

        if record.size <= min_size {
            stats.below_threshold += 1;
            continue;
        }
        if !record.is_hashed() {
            log::debug!("Ignoring unhashed record: {}", record.path.display());
            stats.unhashed += 1;
            continue;
        }

        by_hash.entry(record.hash.clone()).or_default().push(record);
    }

    stats.unique_hashes = by_hash.len();

    let mut groups: Vec<DuplicateGroup> = by_hash
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(hash, files)| DuplicateGroup::new(hash, files))
        .collect();

    groups.sort_by(|a, b| a.files[0].path.cmp(&b.files[0].path));

    for group in &groups {
        log::debug!(
            "Duplicate group {}: {} files, {} bytes each",
            group.hash,
            group.len(),
            group.size
        );
        stats.duplicate_groups += 1;
        stats.duplicate_files += group.duplicate_count();
        stats.reclaimable_space += group.wasted_space();
    }

    log::info!(
        "Grouping complete: {} records → {} groups, {} duplicates",
        stats.total_records,
        stats.duplicate_groups,
        stats.duplicate_files
    );

    (groups, stats)
}
