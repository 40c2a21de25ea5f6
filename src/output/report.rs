//! Console report for the `search` command.
//!
//! For every duplicate group:
//!
//! ```text
//! stderr: * /photos/original.jpg
//! stderr: /photos/original copy.jpg      stdout: /photos/original copy.jpg
//! stderr: /backup/original.jpg           stdout: /backup/original.jpg
//! stderr: (blank line)
//! ```
//!
//! stdout therefore carries only removable paths, one per line, ready to be
//! piped into another tool.

use std::io::Write;

use anyhow::{Context, Result};
use yansi::Paint;

use crate::duplicates::Resolution;

/// Totals accumulated while writing a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Groups written
    pub groups: usize,
    /// Removable paths written
    pub duplicates: usize,
    /// Bytes held by removable paths
    pub reclaimable_space: u64,
}

/// Writes duplicate groups to a primary and a diagnostic stream.
pub struct SearchReport<'a> {
    out: &'a mut dyn Write,
    diag: &'a mut dyn Write,
    color: bool,
    summary: SearchSummary,
}

impl<'a> SearchReport<'a> {
    /// Create a report writing removable paths to `out` and the full
    /// listing to `diag`.
    pub fn new(out: &'a mut dyn Write, diag: &'a mut dyn Write) -> Self {
        Self {
            out,
            diag,
            color: false,
            summary: SearchSummary::default(),
        }
    }

    /// Highlight the kept path on the diagnostic stream.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write one resolved group.
    pub fn write_group(&mut self, resolution: &Resolution<'_>) -> Result<()> {
        let keep_line = format!("* {}", resolution.keep.path.display());
        let written = if self.color {
            writeln!(self.diag, "{}", keep_line.as_str().green().bold())
        } else {
            writeln!(self.diag, "{keep_line}")
        };
        written.context("Failed to write report")?;

        for record in &resolution.remove {
            let path = record.path.display();
            writeln!(self.diag, "{path}").context("Failed to write report")?;
            writeln!(self.out, "{path}").context("Failed to write duplicate path")?;
        }
        writeln!(self.diag).context("Failed to write report")?;

        self.summary.groups += 1;
        self.summary.duplicates += resolution.remove.len();
        self.summary.reclaimable_space += resolution.reclaimable();
        Ok(())
    }

    /// Flush both streams and return the totals.
    pub fn finish(self) -> Result<SearchSummary> {
        self.out.flush().context("Failed to flush output")?;
        self.diag.flush().context("Failed to flush diagnostics")?;
        Ok(self.summary)
    }
}
