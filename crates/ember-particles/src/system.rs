//! Top-level particle system.
//!
//! [`ParticleSystem`] owns the particle store and the injected animation
//! service, and exposes the per-frame entry points: create, move, render
//! and emit. A global enable flag short-circuits all four.

use std::cell::Cell;

use ember_common::TextureHandle;
use tracing::{debug, info, trace, trace_span, warn};

use crate::attachment::ObjectTable;
use crate::config::{ParticleConfig, MAX_DETAIL_LEVEL};
use crate::emit::{emission_count, sample_particle, ParticleEmitter};
use crate::lifecycle::{move_particles, SweepReport};
use crate::particle::{Particle, ParticleInfo, ParticleType};
use crate::render::{render_particles, BillboardSink, RenderStats, View};
use crate::resources::{AnimationInfo, AnimationService, BuiltinAnimations};
use crate::stats::ParticleStats;
use crate::store::{ParticleHandle, ParticleStore};

/// Particle simulation and rendering context.
pub struct ParticleSystem<A: AnimationService> {
    store: ParticleStore,
    animations: A,
    builtins: BuiltinAnimations,
    config: ParticleConfig,
    enabled: bool,
    detail_level: u32,
    rng: fastrand::Rng,
    last_sweep: SweepReport,
    last_render: Cell<RenderStats>,
    created: u64,
    refused: u64,
}

impl<A: AnimationService> ParticleSystem<A> {
    /// Creates a particle system around an animation service.
    ///
    /// Built-in animations are not loaded until [`init`](Self::init).
    pub fn new(mut config: ParticleConfig, animations: A) -> Self {
        config.validate();
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        debug!(
            "Created particle system (capacity {}, detail {})",
            config.initial_capacity, config.detail_level
        );

        Self {
            store: ParticleStore::with_capacity(config.initial_capacity),
            animations,
            builtins: BuiltinAnimations::new(),
            enabled: config.enabled,
            detail_level: config.detail_level,
            config,
            rng,
            last_sweep: SweepReport::default(),
            last_render: Cell::new(RenderStats::default()),
            created: 0,
            refused: 0,
        }
    }

    /// Loads the built-in fire/smoke animations that are not loaded yet.
    ///
    /// Call between levels; already loaded animations are kept.
    pub fn init(&mut self) {
        self.builtins.load(&self.config, &mut self.animations);
    }

    /// Registers the animation backing a built-in type directly.
    pub fn register_builtin(&mut self, kind: ParticleType, animation: AnimationInfo) {
        self.builtins.set(kind, animation);
    }

    /// Whether the animation backing a built-in type is loaded.
    #[must_use]
    pub const fn builtin_loaded(&self, kind: ParticleType) -> bool {
        self.builtins.get(kind).is_some()
    }

    /// Asks the animation service to keep the built-in animations resident.
    pub fn page_in(&mut self) {
        self.builtins.page_in(&mut self.animations);
    }

    /// Creates a single particle.
    ///
    /// Returns `None` when the system is disabled or the built-in animation
    /// for the requested type has not been loaded. Animated bitmaps take
    /// their lifetime from the animation's length rather than from `info`.
    ///
    /// # Panics
    ///
    /// Panics if a bitmap type is created without a valid texture handle.
    pub fn create(&mut self, info: &ParticleInfo) -> Option<ParticleHandle> {
        if !self.enabled {
            return None;
        }

        let mut particle = Particle::from_info(info);

        match info.kind {
            ParticleType::Bitmap | ParticleType::PersistentBitmap => {
                let animation = match info.texture.map(|handle| self.animations.require(handle)) {
                    Some(Ok(animation)) => animation,
                    Some(Err(e)) => panic!("bitmap particle created with {e}"),
                    None => panic!("bitmap particle created without a texture handle"),
                };

                particle.frame_count = animation.frame_count.max(1);
                if particle.frame_count > 1 {
                    particle.max_life = particle.frame_count as f32 / animation.fps.max(1) as f32;
                }
            },
            ParticleType::Fire | ParticleType::Smoke | ParticleType::Smoke2 => {
                let Some(animation) = self.builtins.get(info.kind) else {
                    trace!("{:?} animation not loaded, refusing particle", info.kind);
                    self.refused += 1;
                    return None;
                };

                particle.texture = Some(animation.handle);
                particle.frame_count = animation.frame_count.max(1);
            },
            ParticleType::Debug => {
                particle.frame_count = 1;
            },
        }

        self.created += 1;
        Some(self.store.insert(particle))
    }

    /// Advances every particle by `frametime` seconds and removes the
    /// expired and orphaned ones.
    pub fn move_all(&mut self, frametime: f32, objects: &impl ObjectTable) -> SweepReport {
        if !self.enabled {
            return SweepReport::default();
        }
        if self.store.is_empty() {
            self.last_sweep = SweepReport::default();
            return self.last_sweep;
        }

        let _span = trace_span!("particles_move_all", count = self.store.len()).entered();
        let report = move_particles(&mut self.store, frametime, objects);
        self.last_sweep = report;
        report
    }

    /// Submits every visible particle to `sink`.
    pub fn render_all(
        &self,
        view: &impl View,
        objects: &impl ObjectTable,
        sink: &mut impl BillboardSink,
    ) -> RenderStats {
        if !self.enabled {
            return RenderStats::default();
        }
        if self.store.is_empty() {
            self.last_render.set(RenderStats::default());
            return RenderStats::default();
        }

        let stats = render_particles(&self.store, view, objects, &self.animations, sink);
        self.last_render.set(stats);
        stats
    }

    /// Emits a randomized batch of particles described by `emitter`.
    ///
    /// `range` normalizes the emitter's distance from the eye before the
    /// distance falloff is applied. Returns the number of particles created,
    /// which may be fewer than requested.
    pub fn emit(
        &mut self,
        emitter: &ParticleEmitter,
        kind: ParticleType,
        texture: Option<TextureHandle>,
        range: f32,
        view: &impl View,
    ) -> usize {
        if !self.enabled {
            return 0;
        }
        if !(range.is_finite() && range > 0.0) {
            warn!("Ignoring emission with invalid range {range}");
            return 0;
        }

        let distance = emitter.position.distance(view.eye_position()) / range;
        let count = emission_count(emitter, self.detail_level, distance, &mut self.rng);

        let mut created = 0;
        for _ in 0..count {
            let sample = sample_particle(emitter, &mut self.rng);
            let mut info = ParticleInfo::new(
                emitter.position,
                sample.velocity,
                sample.lifetime,
                sample.radius,
                kind,
            );
            info.texture = texture;
            if self.create(&info).is_some() {
                created += 1;
            }
        }

        trace!(
            "Emitted {}/{} {:?} particles (distance {:.1})",
            created,
            count,
            kind,
            distance
        );
        created
    }

    /// Removes every particle and resets the counters.
    pub fn kill_all(&mut self) {
        self.store.clear();
        self.last_sweep = SweepReport::default();
        self.last_render.set(RenderStats::default());
        self.created = 0;
        self.refused = 0;
    }

    /// Drops all particles on shutdown.
    pub fn close(&mut self) {
        info!("Closing particle system ({} live)", self.store.len());
        self.store.clear();
    }

    /// Whether the system is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the global enable flag.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("Particles {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    /// Flips the global enable flag and returns the new state.
    pub fn toggle_enabled(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Current detail level.
    #[must_use]
    pub const fn detail_level(&self) -> u32 {
        self.detail_level
    }

    /// Sets the detail level read by subsequent emissions (clamped).
    pub fn set_detail_level(&mut self, level: u32) {
        self.detail_level = level.min(MAX_DETAIL_LEVEL);
    }

    /// Particle referenced by `handle`, if it is still alive.
    #[must_use]
    pub fn get(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.store.get(handle)
    }

    /// Read access to the store.
    #[must_use]
    pub const fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Number of live particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no particles are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The injected animation service.
    #[must_use]
    pub const fn animations(&self) -> &A {
        &self.animations
    }

    /// Mutable access to the injected animation service.
    pub fn animations_mut(&mut self) -> &mut A {
        &mut self.animations
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> ParticleStats {
        ParticleStats {
            live: self.store.len(),
            high_water_mark: self.store.high_water_mark(),
            last_sweep: self.last_sweep,
            last_render: self.last_render.get(),
            created: self.created,
            refused: self.refused,
        }
    }
}

impl<A: AnimationService> std::fmt::Debug for ParticleSystem<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleSystem")
            .field("live", &self.store.len())
            .field("enabled", &self.enabled)
            .field("detail_level", &self.detail_level)
            .finish_non_exhaustive()
    }
}
