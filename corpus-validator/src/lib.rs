//! Corpus Validator - Submission Coherence Checks
//!
//! Enforces name coverage and schema-token leakage rejection against a
//! submitted case text, and computes a soft Jaccard similarity warning
//! against a bounded window of recent submissions. Decoding the locked
//! target and looking up instruction state are the caller's job; this
//! crate only knows how to judge text against an already-decoded tree.

mod coverage;
mod error;
mod leakage;
mod normalize;
mod similarity;
mod validator;

pub use coverage::{first_uncovered_name, name_is_covered, names_in_target};
pub use error::{ErrorCode, ValidationError};
pub use leakage::first_leaked_token;
pub use normalize::fold;
pub use similarity::{jaccard_similarity, SimilarityWindow};
pub use validator::{reject_client_supplied_target, validate_case_text};
