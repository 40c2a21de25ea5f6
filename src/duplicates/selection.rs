//! Keep-selection policy for duplicate groups.
//!
//! Exactly one member of every group is kept:
//!
//! 1. Members whose path contains `" copy"` (any case) are set aside.
//! 2. Of the remaining members, the oldest by `mod_time` wins; equal times
//!    fall back to the smallest path.
//! 3. If every member looks like a copy, the smallest path wins.

use std::cmp::Ordering;

use super::DuplicateGroup;
use crate::records::FileRecord;

/// Marker that flags a path as a likely copy. Matched case-insensitively.
pub const COPY_MARKER: &str = " copy";

/// Whether the record's path contains [`COPY_MARKER`].
#[must_use]
pub fn is_copy(record: &FileRecord) -> bool {
    record
        .path
        .to_string_lossy()
        .to_lowercase()
        .contains(COPY_MARKER)
}

fn oldest_first(a: &&FileRecord, b: &&FileRecord) -> Ordering {
    a.mod_time
        .cmp(&b.mod_time)
        .then_with(|| a.path.cmp(&b.path))
}

/// Pick the record to keep. Returns `None` only for an empty slice.
#[must_use]
pub fn select_keep(files: &[FileRecord]) -> Option<&FileRecord> {
    let originals = files.iter().filter(|f| !is_copy(f)).min_by(oldest_first);

    originals.or_else(|| {
        log::debug!("Every member looks like a copy, keeping smallest path");
        files.iter().min_by(|a, b| a.path.cmp(&b.path))
    })
}

/// Keep/remove decision for one duplicate group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// The survivor
    pub keep: &'a FileRecord,
    /// Every member whose path differs from the survivor, in group order
    pub remove: Vec<&'a FileRecord>,
}

impl Resolution<'_> {
    /// Bytes freed by removing every non-kept member.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        self.remove.iter().map(|f| f.size).sum()
    }
}

/// Resolve a group into one survivor and the rest.
///
/// Members sharing the survivor's path are never listed for removal.
/// Returns `None` for an empty group.
#[must_use]
pub fn resolve(group: &DuplicateGroup) -> Option<Resolution<'_>> {
    let keep = select_keep(&group.files)?;
    let remove = group
        .files
        .iter()
        .filter(|f| f.path != keep.path)
        .collect();
    Some(Resolution { keep, remove })
}
