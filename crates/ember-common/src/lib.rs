//! # Ember Common
//!
//! Common types and shared abstractions for the Ember particle runtime.
//!
//! This crate provides foundational types used across all Ember crates:
//! - Resource and scene identifiers (TextureHandle, ObjectIndex, Signature)
//! - Object transforms for attachment resolution
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod transform;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::transform::*;
}

pub use prelude::*;
