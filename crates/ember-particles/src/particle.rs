//! Particle data model.
//!
//! A [`Particle`] is a short-lived billboard with a position, a velocity, a
//! radius and an age-based lifetime. Particles are created from a fully
//! populated [`ParticleInfo`] bundle and owned exclusively by the
//! [`ParticleStore`](crate::store::ParticleStore).

use ember_common::{ObjectIndex, Signature, TextureHandle};
use glam::Vec3;
use thiserror::Error;

use crate::attachment::ObjectTable;

/// Number of particle types.
pub const NUM_PARTICLE_TYPES: u8 = 6;

/// Visual type of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ParticleType {
    /// Generic bitmap or animation supplied by the caller.
    #[default]
    Bitmap = 0,
    /// Bitmap that persists for its full lifetime.
    PersistentBitmap = 1,
    /// Built-in fire animation.
    Fire = 2,
    /// Built-in smoke animation.
    Smoke = 3,
    /// Built-in secondary smoke animation.
    Smoke2 = 4,
    /// Red wireframe sphere, drawn immediately.
    Debug = 5,
}

/// Raw particle type value outside the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid particle type: {0}")]
pub struct InvalidParticleType(pub u8);

impl TryFrom<u8> for ParticleType {
    type Error = InvalidParticleType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Bitmap),
            1 => Ok(Self::PersistentBitmap),
            2 => Ok(Self::Fire),
            3 => Ok(Self::Smoke),
            4 => Ok(Self::Smoke2),
            5 => Ok(Self::Debug),
            other => Err(InvalidParticleType(other)),
        }
    }
}

impl ParticleType {
    /// Whether the caller must supply the texture for this type.
    #[must_use]
    pub const fn uses_caller_bitmap(self) -> bool {
        matches!(self, Self::Bitmap | Self::PersistentBitmap)
    }

    /// Whether this type resolves to a built-in animation.
    #[must_use]
    pub const fn uses_builtin_animation(self) -> bool {
        matches!(self, Self::Fire | Self::Smoke | Self::Smoke2)
    }
}

/// Binding of a particle to a scene object.
///
/// The signature is captured when the particle is created and compared
/// against the live object every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    /// Object table slot.
    pub object: ObjectIndex,
    /// Signature of the object at creation time.
    pub signature: Signature,
}

impl Attachment {
    /// Creates an attachment from a slot and its captured signature.
    #[must_use]
    pub const fn new(object: ObjectIndex, signature: Signature) -> Self {
        Self { object, signature }
    }
}

/// Attribute bundle used to create a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInfo {
    /// Start position. Local offset when attached, world position otherwise.
    pub position: Vec3,
    /// Velocity in units per second.
    pub velocity: Vec3,
    /// Lifetime in seconds. 0 renders exactly one frame.
    pub lifetime: f32,
    /// Billboard half-size.
    pub radius: f32,
    /// Visual type.
    pub kind: ParticleType,
    /// Texture for bitmap types.
    pub texture: Option<TextureHandle>,
    /// Optional binding to a scene object.
    pub attachment: Option<Attachment>,
    /// Play the animation backwards.
    pub reverse: bool,
}

impl ParticleInfo {
    /// Creates an unattached, forward-playing particle description.
    #[must_use]
    pub fn new(position: Vec3, velocity: Vec3, lifetime: f32, radius: f32, kind: ParticleType) -> Self {
        Self {
            position,
            velocity,
            lifetime,
            radius,
            kind,
            texture: None,
            attachment: None,
            reverse: false,
        }
    }

    /// Sets the texture used by bitmap types.
    #[must_use]
    pub const fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Sets an explicit attachment.
    #[must_use]
    pub const fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Attaches to the object currently occupying `object`, capturing its
    /// live signature.
    ///
    /// Returns `None` if the slot is empty or out of range, since the
    /// position would otherwise be read as a world position.
    #[must_use]
    pub fn attached_to(mut self, object: ObjectIndex, objects: &impl ObjectTable) -> Option<Self> {
        let signature = objects.signature(object)?;
        self.attachment = Some(Attachment::new(object, signature));
        Some(self)
    }

    /// Sets reverse playback.
    #[must_use]
    pub const fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }
}

/// A live particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position. Local offset when attached, world position otherwise.
    pub position: Vec3,
    /// Velocity in units per second.
    pub velocity: Vec3,
    /// Billboard half-size.
    pub radius: f32,
    /// Elapsed seconds. 0 until the first lifecycle tick.
    pub age: f32,
    /// Lifetime in seconds.
    pub max_life: f32,
    /// Visual type.
    pub kind: ParticleType,
    /// Resolved texture (base frame for animations).
    pub texture: Option<TextureHandle>,
    /// Number of animation frames, at least 1.
    pub frame_count: u32,
    /// Play the animation backwards.
    pub reverse: bool,
    /// Optional binding to a scene object.
    pub attachment: Option<Attachment>,
    /// Store slot, stable for the particle's lifetime.
    pub index: u32,
}

impl Particle {
    /// Builds an unresolved particle from its creation bundle.
    ///
    /// Texture and frame count are filled in by the particle system once the
    /// visual resource is resolved.
    #[must_use]
    pub fn from_info(info: &ParticleInfo) -> Self {
        Self {
            position: info.position,
            velocity: info.velocity,
            radius: info.radius,
            age: 0.0,
            max_life: info.lifetime,
            kind: info.kind,
            texture: info.texture,
            frame_count: 1,
            reverse: info.reverse,
            attachment: info.attachment,
            index: 0,
        }
    }

    /// Whether the particle has a multi-frame animation.
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        self.frame_count > 1
    }

    /// Billboard sub-variant selector.
    #[must_use]
    pub const fn variant(&self) -> u8 {
        (self.index % 8) as u8
    }
}
