//! File records and the prior-snapshot index.
//!
//! A scan produces a flat list of [`FileRecord`]s. Feeding that list back
//! into the next scan lets unchanged files keep their hash without being
//! read again.
//!
//! # Architecture
//!
//! * [`record`]: the serializable record and its freshness rule.
//! * [`store`]: [`RecordStore`], a path-keyed index over prior records.
//! * [`io`]: parsing the JSON snapshot from stdin or a file.
//!
//! # Cache Validity
//!
//! A stored hash is reused only when all of these hold:
//! * the record has a non-empty hash
//! * its `hash_time` is strictly later than the file's current `mod_time`
//! * its `size` equals the file's current size

pub mod io;
pub mod record;
pub mod store;

pub use record::{now_unix, unix_seconds, FileRecord};
pub use store::RecordStore;
