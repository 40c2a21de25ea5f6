//! Output formatters.
//!
//! - [`json`]: the record snapshot written by `hash` (and on interrupt)
//! - [`report`]: the keep/remove listing written by `search`

pub mod json;
pub mod report;

pub use json::write_records;
pub use report::{SearchReport, SearchSummary};
