//! Incremental tree scan.
//!
//! # Overview
//!
//! [`TreeScanner`] walks a directory, skips files at or below the size
//! threshold, and resolves a [`FileRecord`] for every other file:
//!
//! 1. **Cache hit**: the [`RecordStore`] holds a fresh record for the path,
//!    so its `hash` and `hash_time` are carried over and the file is not read.
//! 2. **Cache miss**: the file is streamed through the [`Hasher`] and
//!    `hash_time` is set to the current time.
//!
//! The scanner owns the list of records it builds. On shutdown it stops at
//! the current file and returns what it has completed so far, flagged as
//! interrupted, so the caller can flush a consistent snapshot.
//!
//! # Error Policy
//!
//! A missing or non-directory root is always an error. Per-file failures
//! are returned as values: in strict mode the first one aborts the scan,
//! otherwise the file is skipped and the error is kept in
//! [`ScanSummary::errors`].

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::progress::ProgressCallback;
use crate::records::{now_unix, FileRecord, RecordStore};

use super::{hash_to_hex, FileEntry, HashError, Hasher, ScanError, Walker, WalkerConfig};

/// Configuration for a tree scan.
#[derive(Clone)]
pub struct ScanConfig {
    /// Files of this many bytes or fewer are skipped.
    pub min_size: u64,
    /// Fail-fast on any per-file error.
    pub strict: bool,
    /// Read size for the content hasher.
    pub chunk_size: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanConfig")
            .field("min_size", &self.min_size)
            .field("strict", &self.strict)
            .field("chunk_size", &self.chunk_size)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_size: 0,
            strict: false,
            chunk_size: super::DEFAULT_CHUNK_SIZE,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl ScanConfig {
    /// Set the size threshold.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set fail-fast on any per-file error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the hasher chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Whether a record's hash was reused or recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Prior hash reused without reading the file.
    Hit,
    /// File was read and hashed.
    Miss,
}

/// Statistics from a tree scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Regular files visited
    pub files_seen: usize,
    /// Files at or below the size threshold
    pub skipped_small: usize,
    /// Records whose prior hash was reused
    pub cache_hits: usize,
    /// Records that had to be hashed
    pub cache_misses: usize,
    /// Bytes read by the hasher
    pub bytes_hashed: u64,
    /// Per-file errors that were skipped (non-strict mode only)
    pub errors: Vec<ScanError>,
    /// Whether the scan stopped early on shutdown
    pub interrupted: bool,
    /// Duration of the scan
    pub duration: Duration,
}

impl ScanSummary {
    /// Whether any file was skipped because of an error.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of records produced.
    #[must_use]
    pub fn records(&self) -> usize {
        self.cache_hits + self.cache_misses
    }
}

/// Records produced by a scan, plus statistics.
///
/// When `summary.interrupted` is set, `records` holds every file that was
/// fully resolved before shutdown and nothing else.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Resolved records in walk order
    pub records: Vec<FileRecord>,
    /// Scan statistics
    pub summary: ScanSummary,
}

/// Walks a tree and resolves a record for every eligible file.
pub struct TreeScanner {
    config: ScanConfig,
    hasher: Hasher,
}

impl TreeScanner {
    /// Create a scanner with the given configuration.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        let mut hasher = Hasher::new().with_chunk_size(config.chunk_size);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a scanner with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ScanConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `root`, reusing fresh hashes from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFound`] or [`ScanError::NotADirectory`] for a
    /// bad root, and in strict mode the first per-file error.
    pub fn scan(&self, root: &Path, store: &RecordStore) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();

        if !root.exists() {
            return Err(ScanError::NotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        log::info!(
            "Scanning {} ({} prior records, min size {} bytes)",
            root.display(),
            store.len(),
            self.config.min_size
        );

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hashing", 0);
            callback.on_message(&format!("Hashing {}", root.display()));
        }

        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut outcome = ScanOutcome::default();

        for result in walker.walk() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    self.handle_error(e, &mut outcome.summary)?;
                    continue;
                }
            };

            outcome.summary.files_seen += 1;

            if entry.size <= self.config.min_size {
                log::debug!("Too small: {} ({} bytes)", entry.path.display(), entry.size);
                outcome.summary.skipped_small += 1;
                continue;
            }

            // Records carry paths as JSON strings
            if entry.path.to_str().is_none() {
                self.handle_error(ScanError::NonUtf8Path(entry.path), &mut outcome.summary)?;
                continue;
            }

            match self.resolve_entry(&entry, store) {
                Ok((record, status)) => {
                    match status {
                        CacheStatus::Hit => outcome.summary.cache_hits += 1,
                        CacheStatus::Miss => {
                            outcome.summary.cache_misses += 1;
                            outcome.summary.bytes_hashed += record.size;
                        }
                    }
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(
                            outcome.records.len() + 1,
                            record.path.to_string_lossy().as_ref(),
                        );
                        // Only bytes actually read count towards progress
                        if status == CacheStatus::Miss {
                            callback.on_item_completed(record.size);
                        }
                    }
                    outcome.records.push(record);
                }
                Err(HashError::Interrupted(path)) => {
                    log::debug!("Abandoned in-flight file: {}", path.display());
                    break;
                }
                Err(e) => self.handle_error(ScanError::Hash(e), &mut outcome.summary)?,
            }
        }

        if self.config.is_shutdown_requested() {
            outcome.summary.interrupted = true;
            log::info!(
                "Scan interrupted after {} records",
                outcome.records.len()
            );
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hashing");
        }

        outcome.summary.duration = start.elapsed();

        log::info!(
            "Scan complete: {} files, {} records ({} cached, {} hashed), {} too small, {} errors",
            outcome.summary.files_seen,
            outcome.records.len(),
            outcome.summary.cache_hits,
            outcome.summary.cache_misses,
            outcome.summary.skipped_small,
            outcome.summary.errors.len()
        );

        Ok(outcome)
    }

    /// Resolve the record for a single file.
    ///
    /// Reuses the prior hash when `store` holds a fresh record for the
    /// path; otherwise hashes the file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file has to be hashed and cannot be read.
    pub fn resolve_entry(
        &self,
        entry: &FileEntry,
        store: &RecordStore,
    ) -> Result<(FileRecord, CacheStatus), HashError> {
        let mod_time = entry.mod_time();

        log::debug!("File: {} ({} bytes)", entry.path.display(), entry.size);

        let (hash, hash_time, status) =
            match store.lookup_fresh(&entry.path, entry.size, mod_time) {
                Some(prior) => {
                    log::debug!("Already hashed: {}", entry.path.display());
                    (prior.hash.clone(), prior.hash_time, CacheStatus::Hit)
                }
                None => {
                    let hash = self.hasher.hash_file(&entry.path)?;
                    (hash_to_hex(hash), now_unix(), CacheStatus::Miss)
                }
            };

        log::trace!(
            "mod_time={} hash={} hash_time={}",
            mod_time,
            hash,
            hash_time
        );

        let record = FileRecord::new(entry.path.clone(), entry.size, mod_time)
            .with_hash(hash, hash_time);
        Ok((record, status))
    }

    fn handle_error(&self, error: ScanError, summary: &mut ScanSummary) -> Result<(), ScanError> {
        if self.config.strict {
            return Err(error);
        }
        log::warn!("Skipping: {}", error);
        summary.errors.push(error);
        Ok(())
    }
}
