//! JSON output for record snapshots.
//!
//! # Output Schema
//!
//! ```json
//! [
//!   {
//!     "path": "/photos/a.jpg",
//!     "size": 1024,
//!     "hash": "ef46db3751d8e999",
//!     "mod_time": 1700000000,
//!     "hash_time": 1700000100
//!   }
//! ]
//! ```
//!
//! The same array is accepted as input by the next run.

use std::io::Write;

use anyhow::{Context, Result};

use crate::records::FileRecord;

/// Serialize records as a pretty-printed JSON array.
pub fn to_json_pretty(records: &[FileRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize records to JSON")
}

/// Write records to `writer` as a pretty-printed JSON array followed by a
/// newline, then flush.
pub fn write_records<W: Write + ?Sized>(writer: &mut W, records: &[FileRecord]) -> Result<()> {
    let json = to_json_pretty(records)?;
    writeln!(writer, "{json}").context("Failed to write records")?;
    writer.flush().context("Failed to flush records")?;
    Ok(())
}
