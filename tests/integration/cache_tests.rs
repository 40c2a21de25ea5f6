use filetime::FileTime;
use hashdupe::records::{FileRecord, RecordStore};
use hashdupe::scanner::{hash_to_hex, Hasher, TreeScanner};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const PAST: i64 = 1_600_000_000;
const FAKE_HASH: &str = "deadbeefdeadbeef";

fn write_with_mtime(dir: &Path, name: &str, content: &[u8], mtime: i64) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    filetime::set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
    path
}

#[test]
fn test_fresh_prior_hash_is_reused_without_reading() {
    let dir = tempdir().unwrap();
    let path = write_with_mtime(dir.path(), "a.txt", b"alpha", PAST);

    // The fake hash can only survive if the file was not rehashed.
    let store = RecordStore::from_records(vec![
        FileRecord::new(path.clone(), 5, PAST).with_hash(FAKE_HASH, PAST + 60)
    ]);

    let outcome = TreeScanner::with_defaults().scan(dir.path(), &store).unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].hash, FAKE_HASH);
    assert_eq!(outcome.records[0].hash_time, PAST + 60);
    assert_eq!(outcome.summary.cache_hits, 1);
    assert_eq!(outcome.summary.cache_misses, 0);
    assert_eq!(outcome.summary.bytes_hashed, 0);
}

#[test]
fn test_size_change_forces_rehash() {
    let dir = tempdir().unwrap();
    let path = write_with_mtime(dir.path(), "a.txt", b"alpha plus more", PAST);

    let store = RecordStore::from_records(vec![
        FileRecord::new(path.clone(), 5, PAST).with_hash(FAKE_HASH, PAST + 60)
    ]);

    let outcome = TreeScanner::with_defaults().scan(dir.path(), &store).unwrap();

    assert_eq!(outcome.summary.cache_misses, 1);
    assert_eq!(
        outcome.records[0].hash,
        hash_to_hex(Hasher::hash_bytes(b"alpha plus more"))
    );
    assert_eq!(outcome.records[0].size, 15);
}

#[test]
fn test_modified_at_hash_time_forces_rehash() {
    let dir = tempdir().unwrap();
    let path = write_with_mtime(dir.path(), "a.txt", b"alpha", PAST);

    // hash_time == mod_time is not strictly after the modification
    let store = RecordStore::from_records(vec![
        FileRecord::new(path.clone(), 5, PAST - 100).with_hash(FAKE_HASH, PAST)
    ]);

    let outcome = TreeScanner::with_defaults().scan(dir.path(), &store).unwrap();

    assert_eq!(outcome.summary.cache_misses, 1);
    assert_ne!(outcome.records[0].hash, FAKE_HASH);
    assert_eq!(outcome.records[0].mod_time, PAST);
    assert!(outcome.records[0].hash_time > PAST);
}

#[test]
fn test_modified_after_hash_time_forces_rehash() {
    let dir = tempdir().unwrap();
    let path = write_with_mtime(dir.path(), "a.txt", b"alpha", PAST + 500);

    let store = RecordStore::from_records(vec![
        FileRecord::new(path.clone(), 5, PAST).with_hash(FAKE_HASH, PAST + 60)
    ]);

    let outcome = TreeScanner::with_defaults().scan(dir.path(), &store).unwrap();

    assert_eq!(outcome.summary.cache_misses, 1);
    assert_ne!(outcome.records[0].hash, FAKE_HASH);
}

#[test]
fn test_unhashed_prior_record_is_ignored() {
    let dir = tempdir().unwrap();
    let path = write_with_mtime(dir.path(), "a.txt", b"alpha", PAST);

    let mut prior = FileRecord::new(path.clone(), 5, PAST);
    prior.hash_time = PAST + 60;
    let store = RecordStore::from_records(vec![prior]);

    let outcome = TreeScanner::with_defaults().scan(dir.path(), &store).unwrap();

    assert_eq!(outcome.summary.cache_misses, 1);
    assert_eq!(outcome.records[0].hash.len(), 16);
}

#[test]
fn test_records_for_vanished_files_are_dropped() {
    let dir = tempdir().unwrap();
    write_with_mtime(dir.path(), "kept.txt", b"kept", PAST);

    let store = RecordStore::from_records(vec![FileRecord::new(
        dir.path().join("gone.txt"),
        4,
        PAST,
    )
    .with_hash(FAKE_HASH, PAST + 60)]);

    let outcome = TreeScanner::with_defaults().scan(dir.path(), &store).unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records[0].path.ends_with("kept.txt"));
}

#[test]
fn test_mixed_hits_and_misses() {
    let dir = tempdir().unwrap();
    let cached = write_with_mtime(dir.path(), "cached.txt", b"cached", PAST);
    write_with_mtime(dir.path(), "fresh.txt", b"fresh", PAST);

    let store = RecordStore::from_records(vec![
        FileRecord::new(cached, 6, PAST).with_hash(FAKE_HASH, PAST + 1)
    ]);

    let outcome = TreeScanner::with_defaults().scan(dir.path(), &store).unwrap();

    assert_eq!(outcome.summary.cache_hits, 1);
    assert_eq!(outcome.summary.cache_misses, 1);
    assert_eq!(outcome.summary.bytes_hashed, 5);
}
