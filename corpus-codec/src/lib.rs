//! Corpus Codec - TOON Encode/Decode Adapter
//!
//! A thin subprocess wrapper around the external TOON encoder/decoder
//! binary. Owns no domain logic beyond the canonical-hash encode cache
//! and the round-trip structural check; schema and business-invariant
//! validation happen upstream in `corpus-generator`/`corpus-validator`.

mod codec;
mod error;

pub use codec::ToonCodec;
pub use error::CodecError;
