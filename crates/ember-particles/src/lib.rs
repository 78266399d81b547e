//! # Ember Particles
//!
//! Real-time billboard particle system.
//!
//! This crate provides:
//! - A dense particle store with O(1) swap-remove and stable handles
//! - Per-frame lifecycle: aging, integration and expiry
//! - Attachment of particles to scene objects with stale-reference detection
//! - Distance-faded, animated billboard rendering through a batching sink
//! - Randomized bulk emission scaled by detail level and distance
//!
//! The host supplies the scene ([`ObjectTable`]), camera ([`View`]),
//! texture animations ([`AnimationService`]) and draw backend
//! ([`BillboardSink`]).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod attachment;
pub mod config;
pub mod emit;
pub mod lifecycle;
pub mod particle;
pub mod render;
pub mod resources;
pub mod shared;
pub mod stats;
pub mod store;
pub mod system;
pub mod visual;

#[cfg(test)]
mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::attachment::{attachment_is_valid, world_position, ObjectTable};
    pub use crate::config::{ParticleConfig, DEFAULT_DETAIL_LEVEL, MAX_DETAIL_LEVEL};
    pub use crate::emit::{EmittedParticle, ParticleEmitter};
    pub use crate::lifecycle::{Fate, SweepReport};
    pub use crate::particle::{
        Attachment, InvalidParticleType, Particle, ParticleInfo, ParticleType, NUM_PARTICLE_TYPES,
    };
    pub use crate::render::{Billboard, BillboardSink, RenderStats, View};
    pub use crate::resources::{AnimationInfo, AnimationLibrary, AnimationService, BuiltinAnimations};
    pub use crate::shared::SharedParticleSystem;
    pub use crate::stats::ParticleStats;
    pub use crate::store::{ParticleHandle, ParticleStore, Sweep};
    pub use crate::system::ParticleSystem;
}

pub use prelude::*;
