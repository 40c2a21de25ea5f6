use clap::Parser;
use hashdupe::app::search_command;
use hashdupe::cli::Cli;
use hashdupe::error::ExitCode;
use hashdupe::output::write_records;
use hashdupe::records::FileRecord;
use hashdupe::signal::ShutdownHandler;
use std::fs::File;
use tempfile::tempdir;

fn hashed(path: &str, size: u64, mod_time: i64, hash: &str) -> FileRecord {
    FileRecord::new(path, size, mod_time).with_hash(hash, mod_time + 10)
}

fn run_search(records: Vec<FileRecord>, min_size: u64) -> (String, String) {
    let mut out = Vec::new();
    let mut diag = Vec::new();
    let code = search_command(
        records,
        min_size,
        &ShutdownHandler::new(),
        &mut out,
        &mut diag,
        false,
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
    (
        String::from_utf8(out).unwrap(),
        String::from_utf8(diag).unwrap(),
    )
}

#[test]
fn test_copy_marker_loses_even_when_older() {
    let (out, diag) = run_search(
        vec![
            hashed("/d/a.txt", 50, 200, "0000000000000001"),
            hashed("/d/a copy.txt", 50, 100, "0000000000000001"),
        ],
        0,
    );

    assert_eq!(out, "/d/a copy.txt\n");
    assert!(diag.starts_with("* /d/a.txt\n"));
}

#[test]
fn test_oldest_wins() {
    let (out, diag) = run_search(
        vec![
            hashed("/d/x.txt", 50, 300, "0000000000000002"),
            hashed("/d/y.txt", 50, 100, "0000000000000002"),
        ],
        0,
    );

    assert_eq!(out, "/d/x.txt\n");
    assert_eq!(diag, "* /d/y.txt\n/d/x.txt\n\n");
}

#[test]
fn test_all_copies_keeps_smallest_path() {
    let (out, _) = run_search(
        vec![
            hashed("/d/b copy.txt", 50, 100, "0000000000000003"),
            hashed("/d/a Copy.txt", 50, 300, "0000000000000003"),
        ],
        0,
    );

    assert_eq!(out, "/d/b copy.txt\n");
}

#[test]
fn test_groups_reported_in_path_order() {
    let (out, _) = run_search(
        vec![
            hashed("/z/1", 10, 1, "00000000000000aa"),
            hashed("/b/1", 10, 1, "00000000000000bb"),
            hashed("/z/2", 10, 2, "00000000000000aa"),
            hashed("/b/2", 10, 2, "00000000000000bb"),
        ],
        0,
    );

    assert_eq!(out, "/b/2\n/z/2\n");
}

#[test]
fn test_threshold_and_unhashed_records_excluded() {
    let (out, diag) = run_search(
        vec![
            hashed("/small/1", 5, 1, "00000000000000cc"),
            hashed("/small/2", 5, 2, "00000000000000cc"),
            FileRecord::new("/unhashed/1", 500, 1),
            FileRecord::new("/unhashed/2", 500, 2),
        ],
        5,
    );

    assert!(out.is_empty());
    assert!(diag.is_empty());
}

#[test]
fn test_no_records() {
    let (out, diag) = run_search(Vec::new(), 0);
    assert!(out.is_empty());
    assert!(diag.is_empty());
}

#[test]
fn test_run_app_search_from_records_file() {
    let dir = tempdir().unwrap();
    let records_path = dir.path().join("records.json");
    let mut file = File::create(&records_path).unwrap();
    write_records(
        &mut file,
        &[
            hashed("/d/a.txt", 50, 1, "0000000000000004"),
            hashed("/d/b.txt", 50, 2, "0000000000000004"),
        ],
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "hashdupe",
        "-q",
        "search",
        "--records",
        records_path.to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(hashdupe::run_app(cli).unwrap(), ExitCode::Success);
}
