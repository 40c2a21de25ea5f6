//! hashdupe - Incremental Duplicate File Finder
//!
//! Hashes every file under a directory with XXH64 and prints the results as a
//! JSON record list. Feeding that list back in on the next run reuses the
//! hashes of files that have not changed since they were hashed. A separate
//! search pass groups records by hash and reports removable duplicates,
//! keeping the oldest file that is not named like a copy.

pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod records;
pub mod scanner;
pub mod signal;

pub use app::run_app;
