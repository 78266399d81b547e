//! Animation and texture resource seam.
//!
//! The particle system never touches texture memory itself. It asks an
//! injected [`AnimationService`] to load animations, describe handles and
//! pick frames. [`AnimationLibrary`] is an in-memory implementation used by
//! the host binary and by tests.

use std::collections::HashMap;

use ember_common::{ResourceError, TextureHandle};
use tracing::{debug, info, warn};

use crate::config::ParticleConfig;
use crate::particle::ParticleType;

/// Frame layout of a loaded bitmap or animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationInfo {
    /// Base handle. Frame `n` lives at `handle.frame(n)`.
    pub handle: TextureHandle,
    /// Number of frames, at least 1.
    pub frame_count: u32,
    /// Playback rate in frames per second.
    pub fps: u32,
}

/// Texture/animation service used by the particle system.
pub trait AnimationService {
    /// Loads a named animation, returning its frame layout.
    fn load_animation(&mut self, name: &str) -> Result<AnimationInfo, ResourceError>;

    /// Frame layout of an already loaded handle.
    fn info(&self, handle: TextureHandle) -> Option<AnimationInfo>;

    /// Whether `handle` refers to a loaded resource.
    fn is_valid_handle(&self, handle: TextureHandle) -> bool {
        self.info(handle).is_some()
    }

    /// Frame layout of `handle`, or [`ResourceError::InvalidHandle`].
    fn require(&self, handle: TextureHandle) -> Result<AnimationInfo, ResourceError> {
        self.info(handle).ok_or(ResourceError::InvalidHandle(handle))
    }

    /// Frame to display for an animation of the given age and lifetime.
    fn frame_index_for(&self, handle: TextureHandle, age: f32, max_life: f32) -> u32;

    /// Paging hint: keep the resource resident.
    fn ensure_resident(&mut self, handle: TextureHandle);
}

/// Cache of the animations backing the built-in particle types.
#[derive(Debug, Clone, Default)]
pub struct BuiltinAnimations {
    fire: Option<AnimationInfo>,
    smoke: Option<AnimationInfo>,
    smoke2: Option<AnimationInfo>,
}

impl BuiltinAnimations {
    /// Creates an empty cache. Built-in types are refused until loaded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fire: None,
            smoke: None,
            smoke2: None,
        }
    }

    /// Loads every configured built-in animation that is not cached yet.
    ///
    /// Safe to call between levels; already loaded entries are kept.
    pub fn load(&mut self, config: &ParticleConfig, service: &mut impl AnimationService) {
        if let Some(name) = config.fire_animation.as_deref() {
            Self::load_slot(&mut self.fire, name, service);
        }
        Self::load_slot(&mut self.smoke, &config.smoke_animation, service);
        Self::load_slot(&mut self.smoke2, &config.smoke2_animation, service);
    }

    fn load_slot(slot: &mut Option<AnimationInfo>, name: &str, service: &mut impl AnimationService) {
        if slot.is_some() {
            return;
        }
        match service.load_animation(name) {
            Ok(animation) => {
                info!(
                    "Loaded particle animation '{}' ({} frames)",
                    name, animation.frame_count
                );
                *slot = Some(animation);
            },
            Err(e) => warn!("Particle animation unavailable: {e}"),
        }
    }

    /// Registers an animation for a built-in type directly.
    ///
    /// Has no effect for caller-supplied or debug types.
    pub fn set(&mut self, kind: ParticleType, animation: AnimationInfo) {
        match kind {
            ParticleType::Fire => self.fire = Some(animation),
            ParticleType::Smoke => self.smoke = Some(animation),
            ParticleType::Smoke2 => self.smoke2 = Some(animation),
            _ => debug!("Ignoring built-in animation for {:?}", kind),
        }
    }

    /// Cached animation for a built-in type.
    #[must_use]
    pub const fn get(&self, kind: ParticleType) -> Option<AnimationInfo> {
        match kind {
            ParticleType::Fire => self.fire,
            ParticleType::Smoke => self.smoke,
            ParticleType::Smoke2 => self.smoke2,
            _ => None,
        }
    }

    /// Asks the service to keep every cached animation resident.
    pub fn page_in(&self, service: &mut impl AnimationService) {
        for animation in [self.fire, self.smoke, self.smoke2].into_iter().flatten() {
            service.ensure_resident(animation.handle);
        }
    }
}

/// Registered animation entry.
#[derive(Debug, Clone)]
struct LibraryEntry {
    name: String,
    info: AnimationInfo,
}

/// In-memory animation registry.
///
/// Animations are registered by name with a frame count and frame rate;
/// each registration reserves a contiguous handle range.
#[derive(Debug, Clone)]
pub struct AnimationLibrary {
    entries: Vec<LibraryEntry>,
    by_name: HashMap<String, usize>,
    resident: Vec<TextureHandle>,
    next_handle: u32,
}

impl Default for AnimationLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationLibrary {
    /// Creates an empty library. Handle 0 is never issued.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            resident: Vec::new(),
            next_handle: 1,
        }
    }

    /// Registers an animation and returns its layout.
    ///
    /// Re-registering a name returns the existing layout.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        frame_count: u32,
        fps: u32,
    ) -> Result<AnimationInfo, ResourceError> {
        let name = name.into();
        if let Some(&index) = self.by_name.get(&name) {
            return Ok(self.entries[index].info);
        }
        if frame_count == 0 {
            return Err(ResourceError::EmptyAnimation(name));
        }

        let Some(next_handle) = self.next_handle.checked_add(frame_count) else {
            return Err(ResourceError::HandlesExhausted(name));
        };

        let info = AnimationInfo {
            handle: TextureHandle::new(self.next_handle),
            frame_count,
            fps: fps.max(1),
        };
        self.next_handle = next_handle;
        self.by_name.insert(name.clone(), self.entries.len());
        self.entries.push(LibraryEntry { name, info });
        Ok(info)
    }

    /// Registers a single-frame bitmap.
    pub fn register_bitmap(&mut self, name: impl Into<String>) -> Result<TextureHandle, ResourceError> {
        self.register(name, 1, 1).map(|info| info.handle)
    }

    /// Name an animation was registered under.
    #[must_use]
    pub fn name_of(&self, handle: TextureHandle) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.info.handle == handle)
            .map(|entry| entry.name.as_str())
    }

    /// Handles that have been paged in.
    #[must_use]
    pub fn resident(&self) -> &[TextureHandle] {
        &self.resident
    }
}

impl AnimationService for AnimationLibrary {
    fn load_animation(&mut self, name: &str) -> Result<AnimationInfo, ResourceError> {
        self.by_name
            .get(name)
            .map(|&index| self.entries[index].info)
            .ok_or_else(|| ResourceError::AnimationNotFound(name.to_string()))
    }

    fn info(&self, handle: TextureHandle) -> Option<AnimationInfo> {
        self.entries
            .iter()
            .map(|entry| entry.info)
            .find(|info| info.handle == handle)
    }

    fn frame_index_for(&self, handle: TextureHandle, age: f32, max_life: f32) -> u32 {
        let Some(info) = self.info(handle) else {
            return 0;
        };
        let last = info.frame_count - 1;
        let frame = if max_life > 0.0 {
            (age / max_life * info.frame_count as f32) as u32
        } else {
            (age * info.fps as f32) as u32
        };
        frame.min(last)
    }

    fn ensure_resident(&mut self, handle: TextureHandle) {
        if !self.resident.contains(&handle) {
            self.resident.push(handle);
        }
    }
}
