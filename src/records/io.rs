//! Reading the prior record snapshot.

use anyhow::{Context, Result};
use std::io::{IsTerminal, Read};
use std::path::Path;

use super::FileRecord;

/// Parse a JSON array of records.
///
/// Blank input and a literal `null` both mean "no prior records".
pub fn parse_records(content: &str) -> Result<Vec<FileRecord>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records: Option<Vec<FileRecord>> = serde_json::from_str(content)
        .context("Failed to parse record list. Expected a JSON array of file records.")?;

    Ok(records.unwrap_or_default())
}

/// Read and parse all records from `reader`.
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<FileRecord>> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .context("Failed to read record input")?;
    parse_records(&content)
}

/// Load records from a file.
pub fn load_records(path: &Path) -> Result<Vec<FileRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;
    parse_records(&content)
        .with_context(|| format!("Invalid records file: {}", path.display()))
}

/// Read records from stdin when it is piped; an interactive terminal
/// yields an empty list instead of blocking.
pub fn read_stdin_records() -> Result<Vec<FileRecord>> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        log::debug!("stdin is a terminal, starting without prior records");
        return Ok(Vec::new());
    }
    read_records(stdin.lock())
}
