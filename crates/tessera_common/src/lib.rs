//! Shared foundational types used across the tessera style compiler.
//!
//! This crate provides content hashing for stable class-name suffixes and the
//! internal-error result type used when an invariant of the engine is broken.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, TesseraResult};
