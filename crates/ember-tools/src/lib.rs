//! # Ember Tools
//!
//! Development tools for the Ember particle runtime.
//!
//! This crate provides:
//! - A headless debug console with history and built-in commands
//! - Particle commands (`particles`, `particle_stats`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod console;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::console::*;
}

pub use prelude::*;
