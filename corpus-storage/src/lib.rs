//! Corpus Storage - Append-Only Logs, Counters, and Dashboards
//!
//! Everything the coordinator persists lives under one state
//! directory: append-only JSONL logs for instructions and submissions,
//! per-record audit copies, write-to-temp-and-rename counters and
//! dashboards, the two training-export files, and startup
//! reconciliation that rebuilds counters from the logs rather than
//! trusting a possibly-stale `counters.json`.

mod atomic;
mod error;
mod jsonl;
mod paths;
mod seed;
mod store;
mod summary;
mod training;

pub use error::StorageError;
pub use paths::StatePaths;
pub use seed::{load_seed_corpus, SeedRow};
pub use store::Store;
pub use summary::{build_snapshot, BucketCoverage, DashboardSnapshot};
pub use training::{ChatMessage, TrainingRow};
