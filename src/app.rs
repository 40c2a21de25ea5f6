//! Command dispatch.
//!
//! [`run_app`] wires the CLI, configuration, logging and signal handling
//! together and hands off to [`hash_command`] or [`search_command`]. Both
//! commands take their output streams as parameters so they can be driven
//! from tests without touching the process stdio.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use bytesize::ByteSize;

use crate::cli::{Cli, Commands, HashArgs, SearchArgs};
use crate::config::Config;
use crate::duplicates::{group_by_hash, resolve};
use crate::error::ExitCode;
use crate::logging::init_logging;
use crate::output::{write_records, SearchReport};
use crate::progress::Progress;
use crate::records::io::{load_records, read_stdin_records};
use crate::records::{FileRecord, RecordStore};
use crate::scanner::{ScanConfig, TreeScanner, WalkerConfig};
use crate::signal::{install_handler, ShutdownHandler};

/// Run the parsed command line to completion.
///
/// # Errors
///
/// Returns an error for malformed input or configuration, an unusable scan
/// root, a strict-mode file failure, or a failed write to stdout.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);

    // Hooked before any input is read so Ctrl+C always ends in a snapshot.
    let handler = install_handler()?;

    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref())?;
    log::debug!("Effective configuration: {config:?}");

    let show_progress = !cli.quiet && cli.verbose == 0;
    let color = !cli.no_color && std::io::stderr().is_terminal();

    match cli.command {
        Commands::Hash(args) => run_hash(args, &config, &handler, show_progress),
        Commands::Search(args) => run_search(args, &config, &handler, color),
        Commands::Config => {
            let rendered = config.to_toml()?;
            let mut out = std::io::stdout().lock();
            write!(out, "{rendered}").context("Failed to write configuration")?;
            out.flush().context("Failed to flush configuration")?;
            Ok(ExitCode::Success)
        }
    }
}

fn run_hash(
    args: HashArgs,
    config: &Config,
    handler: &ShutdownHandler,
    show_progress: bool,
) -> Result<ExitCode> {
    let root = resolve_root(args.path.as_deref())?;

    let min_size = match args.min_size {
        Some(size) => size,
        None => config.min_size_bytes()?,
    };
    let chunk_size = match args.chunk_size {
        Some(size) => usize::try_from(size).context("Chunk size does not fit in memory")?,
        None => config.chunk_size,
    };

    let mut out = std::io::stdout().lock();

    // Read prior records before any scanning so bad input aborts early.
    let loaded = load_prior_records(args.records.as_deref());
    let Some(prior) = settle_prior_records(loaded, handler, &mut out)? else {
        return Ok(ExitCode::Success);
    };

    let mut scan_config = ScanConfig::default()
        .with_min_size(min_size)
        .with_strict(args.strict || config.strict)
        .with_chunk_size(chunk_size)
        .with_walker_config(WalkerConfig {
            follow_symlinks: args.follow_symlinks || config.follow_symlinks,
        })
        .with_shutdown_flag(handler.get_flag());

    if show_progress {
        scan_config = scan_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    hash_command(&root, scan_config, prior, &mut out)
}

fn run_search(
    args: SearchArgs,
    config: &Config,
    handler: &ShutdownHandler,
    color: bool,
) -> Result<ExitCode> {
    let min_size = match args.min_size {
        Some(size) => size,
        None => config.min_size_bytes()?,
    };

    let mut out = std::io::stdout().lock();
    let loaded = load_prior_records(args.records.as_deref());
    let Some(records) = settle_prior_records(loaded, handler, &mut out)? else {
        return Ok(ExitCode::Success);
    };

    let mut diag = std::io::stderr();
    search_command(records, min_size, handler, &mut out, &mut diag, color)
}

/// Resolve the outcome of reading prior records.
///
/// If shutdown was requested while reading, the empty snapshot is written
/// to `out` and `None` is returned, whatever the read produced. Otherwise
/// read errors propagate.
fn settle_prior_records(
    loaded: Result<Vec<FileRecord>>,
    shutdown: &ShutdownHandler,
    out: &mut dyn Write,
) -> Result<Option<Vec<FileRecord>>> {
    if shutdown.is_shutdown_requested() {
        log::info!("Interrupted while reading records");
        write_records(out, &[])?;
        return Ok(None);
    }
    loaded.map(Some)
}

/// Scan `root` and write the resulting records to `out` as JSON.
///
/// An interrupted scan still writes the records completed so far and
/// reports success. Skipped files turn the result into
/// [`ExitCode::PartialSuccess`].
///
/// # Errors
///
/// Returns an error if the root is unusable, if a file fails in strict
/// mode, or if writing to `out` fails.
pub fn hash_command(
    root: &Path,
    config: ScanConfig,
    prior: Vec<FileRecord>,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let store = RecordStore::from_records(prior);
    let scanner = TreeScanner::new(config);

    let outcome = scanner
        .scan(root, &store)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    write_records(out, &outcome.records)?;

    let summary = &outcome.summary;
    if summary.interrupted {
        log::info!("Interrupted, wrote {} completed records", outcome.records.len());
        return Ok(ExitCode::Success);
    }

    log::info!(
        "Hashed {} in {:.2?}",
        ByteSize::b(summary.bytes_hashed),
        summary.duration
    );

    if summary.is_degraded() {
        log::warn!(
            "Completed with {} skipped files; their records are missing from the output",
            summary.errors.len()
        );
        return Ok(ExitCode::PartialSuccess);
    }

    Ok(ExitCode::Success)
}

/// Find duplicate groups among `records` and write the report.
///
/// Removable paths go to `out`, the full keep/remove listing to `diag`.
/// Paths for `out` are held back until every group is resolved. If shutdown
/// is requested between groups, they are discarded and `out` receives only
/// `[]`; `diag` keeps what was already listed.
///
/// # Errors
///
/// Returns an error if writing to either stream fails.
pub fn search_command(
    records: Vec<FileRecord>,
    min_size: u64,
    shutdown: &ShutdownHandler,
    out: &mut dyn Write,
    diag: &mut dyn Write,
    color: bool,
) -> Result<ExitCode> {
    log::info!("Searching {} files...", records.len());

    let (groups, stats) = group_by_hash(records, min_size);
    log::debug!(
        "{} unique hashes, {} below threshold, {} unhashed",
        stats.unique_hashes,
        stats.below_threshold,
        stats.unhashed
    );

    let mut interrupted = false;
    let mut removable: Vec<u8> = Vec::new();
    let mut report = SearchReport::new(&mut removable, diag).with_color(color);
    for group in &groups {
        if shutdown.is_shutdown_requested() {
            interrupted = true;
            break;
        }
        if let Some(resolution) = resolve(group) {
            report.write_group(&resolution)?;
        }
    }
    let summary = report.finish()?;

    if interrupted {
        write_records(out, &[])?;
        return Ok(ExitCode::Success);
    }

    out.write_all(&removable)
        .context("Failed to write duplicate paths")?;
    out.flush().context("Failed to flush output")?;

    log::info!(
        "Found {} duplicate groups, {} removable files, {} reclaimable",
        summary.groups,
        summary.duplicates,
        ByteSize::b(summary.reclaimable_space)
    );

    Ok(ExitCode::Success)
}

/// Prior records from `--records FILE`, or from stdin when piped.
fn load_prior_records(path: Option<&Path>) -> Result<Vec<FileRecord>> {
    let records = match path {
        Some(p) => load_records(p)?,
        None => read_stdin_records()?,
    };
    log::debug!("Loaded {} prior records", records.len());
    Ok(records)
}

/// The scan root as an absolute path, defaulting to the working directory.
fn resolve_root(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => std::path::absolute(p)
            .with_context(|| format!("Failed to resolve path: {}", p.display())),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}
