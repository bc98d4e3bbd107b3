//! Persistence backends for the event-record pipeline.
//!
//! Two backends hang off one [`DualSink`]: a structured sqlite "ntuple" store
//! shared by all workers behind a mutex, and per-worker CSV shards merged
//! into single files at run end by [`merge_all`]. Output failures disable the
//! affected stream and are logged; they never propagate back into the event
//! loop.

pub mod merge;
pub mod schema;
pub mod shard;
pub mod sink;
pub mod store;

pub use merge::{CSV_TABLES, MergeError, merge, merge_all};
pub use shard::{CsvStream, ShardSet};
pub use sink::DualSink;
pub use store::SqliteStore;
