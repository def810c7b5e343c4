//! Corpus Generator - Schema-Driven Sparse Target Generation
//!
//! Synthesizes a structured target payload aligned with a drawn
//! diversity signature: sparse, schema-valid, business-coherent, and
//! encoded to TOON via the codec adapter. Retries bounded attempts
//! independently on any validation-gate failure.

mod builder;
mod error;
mod gates;
mod names;
mod pipeline;
mod prompt;
mod repair;
mod values;
mod vocabulary;

pub use error::GeneratorError;
pub use pipeline::{GeneratedTarget, TargetGenerator};
