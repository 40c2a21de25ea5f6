use clap::Parser;
use hashdupe::app::hash_command;
use hashdupe::cli::Cli;
use hashdupe::error::ExitCode;
use hashdupe::progress::ProgressCallback;
use hashdupe::records::io::parse_records;
use hashdupe::records::RecordStore;
use hashdupe::scanner::{ScanConfig, ScanError, TreeScanner};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_run_app_missing_root_fails() {
    let dir = tempdir().unwrap();
    let records = dir.path().join("records.json");
    fs::write(&records, "[]").unwrap();
    let missing = dir.path().join("missing");

    let cli = Cli::try_parse_from([
        "hashdupe",
        "-q",
        "hash",
        missing.to_str().unwrap(),
        "--records",
        records.to_str().unwrap(),
    ])
    .unwrap();

    let err = hashdupe::run_app(cli).unwrap_err();
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_run_app_malformed_records_fails() {
    let dir = tempdir().unwrap();
    let records = dir.path().join("records.json");
    fs::write(&records, "{ not json").unwrap();

    let cli = Cli::try_parse_from([
        "hashdupe",
        "-q",
        "search",
        "--records",
        records.to_str().unwrap(),
    ])
    .unwrap();

    let err = hashdupe::run_app(cli).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid records file"));
}

#[test]
fn test_run_app_missing_records_file_fails() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "hashdupe",
        "-q",
        "hash",
        dir.path().to_str().unwrap(),
        "--records",
        dir.path().join("nope.json").to_str().unwrap(),
    ])
    .unwrap();

    assert!(hashdupe::run_app(cli).is_err());
}

#[test]
fn test_run_app_missing_config_file_fails() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "hashdupe",
        "-q",
        "--config",
        dir.path().join("absent.toml").to_str().unwrap(),
        "config",
    ])
    .unwrap();

    assert!(hashdupe::run_app(cli).is_err());
}

#[test]
fn test_run_app_hash_from_records_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), "hello").unwrap();
    let records = dir.path().join("records.json");
    fs::write(&records, "null").unwrap();

    let cli = Cli::try_parse_from([
        "hashdupe",
        "-q",
        "hash",
        data.to_str().unwrap(),
        "--records",
        records.to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(hashdupe::run_app(cli).unwrap(), ExitCode::Success);
}

#[test]
fn test_interrupted_hash_writes_snapshot_and_succeeds() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    fs::write(dir.path().join("b.txt"), "bravo").unwrap();

    let config = ScanConfig::default().with_shutdown_flag(Arc::new(AtomicBool::new(true)));
    let mut out = Vec::new();
    let code = hash_command(dir.path(), config, Vec::new(), &mut out).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
}

/// Raises the shutdown flag once the first record has been produced.
struct StopAfterFirstRecord(Arc<AtomicBool>);

impl ProgressCallback for StopAfterFirstRecord {
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    fn on_progress(&self, current: usize, _path: &str) {
        if current >= 1 {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_shutdown_during_scan_writes_completed_records() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    fs::write(dir.path().join("b.txt"), "bravo").unwrap();
    fs::write(dir.path().join("c.txt"), "charlie").unwrap();

    let flag = Arc::new(AtomicBool::new(false));
    let config = ScanConfig::default()
        .with_shutdown_flag(Arc::clone(&flag))
        .with_progress_callback(Arc::new(StopAfterFirstRecord(Arc::clone(&flag))));
    let mut out = Vec::new();
    let code = hash_command(dir.path(), config, Vec::new(), &mut out).unwrap();

    assert_eq!(code, ExitCode::Success);
    let records = parse_records(&String::from_utf8(out).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].path.ends_with("a.txt"));
    assert_eq!(records[0].hash.len(), 16);
}

#[cfg(unix)]
mod non_utf8 {
    use super::*;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    #[test]
    fn test_non_utf8_name_skipped_and_rest_written() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.txt"), "fine").unwrap();
        // Some filesystems refuse names that are not valid UTF-8
        let bad = dir.path().join(OsStr::from_bytes(b"bad\xff.txt"));
        if fs::write(&bad, "bad").is_err() {
            return;
        }

        let mut out = Vec::new();
        let code = hash_command(dir.path(), ScanConfig::default(), Vec::new(), &mut out).unwrap();

        assert_eq!(code, ExitCode::PartialSuccess);
        let records = parse_records(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].path.ends_with("good.txt"));
    }
}

#[cfg(unix)]
mod unreadable {
    use super::*;
    use std::fs::File;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Creates `secret.txt` with no permissions. Returns `None` when the
    /// current user can read it anyway (e.g. root).
    fn unreadable_file(dir: &Path) -> Option<PathBuf> {
        let path = dir.join("secret.txt");
        fs::write(&path, "secret").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&path).is_ok() {
            return None;
        }
        Some(path)
    }

    #[test]
    fn test_unreadable_file_skipped_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ok.txt"), "fine").unwrap();
        let Some(secret) = unreadable_file(dir.path()) else {
            return;
        };

        let mut out = Vec::new();
        let code = hash_command(dir.path(), ScanConfig::default(), Vec::new(), &mut out).unwrap();

        assert_eq!(code, ExitCode::PartialSuccess);
        let json = String::from_utf8(out).unwrap();
        assert!(json.contains("ok.txt"));
        assert!(!json.contains("secret.txt"));

        fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn test_unreadable_file_fatal_in_strict_mode() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ok.txt"), "fine").unwrap();
        let Some(secret) = unreadable_file(dir.path()) else {
            return;
        };

        let scanner = TreeScanner::new(ScanConfig::default().with_strict(true));
        let result = scanner.scan(dir.path(), &RecordStore::new());

        assert!(matches!(result, Err(ScanError::Hash(_))));

        let mut out = Vec::new();
        let strict = ScanConfig::default().with_strict(true);
        assert!(hash_command(dir.path(), strict, Vec::new(), &mut out).is_err());
        assert!(out.is_empty());

        fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
