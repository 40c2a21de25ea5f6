//! Command-line interface definitions for hashdupe.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, color, error format, config file) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Hash the current directory
//! hashdupe hash > records.json
//!
//! # Rescan, reusing hashes of unchanged files
//! hashdupe hash < records.json > next.json
//!
//! # List removable duplicates larger than 1MB
//! hashdupe search -m 1MB < next.json
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Incremental duplicate file finder.
///
/// `hash` walks a directory and prints a JSON array of file records. Feeding
/// that array back in on the next run skips rehashing unchanged files.
/// `search` groups records by content hash and lists removable duplicates.
#[derive(Debug, Parser)]
#[command(name = "hashdupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for hashdupe.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Hash every file under a directory and print the records as JSON
    Hash(HashArgs),
    /// Find duplicates among previously hashed records
    Search(SearchArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the hash subcommand.
#[derive(Debug, Args)]
pub struct HashArgs {
    /// Directory to scan (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Skip files at or below this size (e.g., 512K, 10MB, 1.5GiB)
    ///
    /// Supports suffixes: B, K, KB, KiB, M, MB, MiB, G, GB, GiB, T, TB, TiB.
    /// All units are binary (1KB = 1024 bytes).
    #[arg(short, long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Read prior records from FILE instead of stdin
    #[arg(long, value_name = "FILE")]
    pub records: Option<PathBuf>,

    /// Abort on the first unreadable file instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause loops if symlinks form cycles (loops are detected
    /// and skipped).
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Bytes read per hashing chunk
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub chunk_size: Option<u64>,
}

/// Arguments for the search subcommand.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Ignore records at or below this size (e.g., 512K, 10MB, 1.5GiB)
    #[arg(short, long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Read records from FILE instead of stdin
    #[arg(long, value_name = "FILE")]
    pub records: Option<PathBuf>,
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, K, KB, KiB, M, MB, MiB, G, GB, GiB, T, TB, TiB,
/// P, PB, PiB. Case-insensitive. Every unit is a power of 1024, so `KB`
/// and `KiB` are equivalent. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use hashdupe::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1024);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("10MB").unwrap(), 10_485_760);
/// assert_eq!(parse_size("1.5K").unwrap(), 1536);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1 << 10,
        "M" | "MB" | "MIB" => 1 << 20,
        "G" | "GB" | "GIB" => 1 << 30,
        "T" | "TB" | "TIB" => 1 << 40,
        "P" | "PB" | "PIB" => 1 << 50,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    // Whole numbers stay in integer arithmetic so sizes above 2^53 are exact
    if !num_str.contains('.') {
        let num: u64 = num_str
            .parse()
            .map_err(|_| format!("Invalid number: '{num_str}'"))?;
        return num
            .checked_mul(multiplier)
            .ok_or_else(|| format!("Size too large: '{s}'"));
    }

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let bytes = num * multiplier as f64;
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(format!("Size too large: '{s}'"));
    }

    Ok(bytes as u64)
}
