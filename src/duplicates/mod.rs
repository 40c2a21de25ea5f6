//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Hash-based grouping of file records
//! - Choosing which member of each group to keep

pub mod groups;
pub mod selection;

pub use groups::{group_by_hash, DuplicateGroup, GroupingStats};
pub use selection::{is_copy, resolve, select_keep, Resolution, COPY_MARKER};
