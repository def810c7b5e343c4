//! Corpus Schema - Master Schema Loading and Indexing
//!
//! Loads the single master schema JSON file and builds an in-memory
//! index of every leaf path (with its declared type and optional enum
//! set) and every non-leaf prefix. Pure parsing and lookup, no target
//! generation or validation logic lives here.

mod error;
mod index;

pub use error::SchemaError;
pub use index::SchemaIndex;
