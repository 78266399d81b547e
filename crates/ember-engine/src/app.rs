//! Application lifecycle management.
//!
//! Headless frame loop: a few emitters and an orbiting object feed the
//! particle system, which is stepped at a fixed rate and rendered into
//! the batching renderer once per frame.

use anyhow::Result;
use ember_common::{ObjectIndex, ObjectTransform, TextureHandle};
use ember_particles::{
    AnimationLibrary, ParticleEmitter, ParticleInfo, ParticleSystem, ParticleType,
};
use ember_tools::DebugConsole;
use glam::{Quat, Vec3};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::renderer::BatchRenderer;
use crate::scene::{PerspectiveCamera, SceneObjects};
use crate::timing::FrameTiming;

/// Scene object slots available to the demo.
const MAX_OBJECTS: usize = 16;

/// Radius of the orbiting object's path.
const ORBIT_RADIUS: f32 = 20.0;

/// Centre of the orbit.
const ORBIT_CENTER: Vec3 = Vec3::new(0.0, 0.0, 40.0);

/// Outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames rendered
    pub frames: u32,
    /// Particles created over the run
    pub created: u64,
    /// Peak live particles
    pub peak: usize,
    /// Batched draw calls issued
    pub draw_calls: u64,
    /// Particles removed because their object went away
    pub detached: usize,
}

/// Textures registered for the demo's bitmap particles.
#[derive(Debug, Clone, Copy)]
struct DemoTextures {
    spark: TextureHandle,
    explosion: TextureHandle,
}

/// Registers the demo animations and the configured built-ins.
fn build_library(config: &EngineConfig) -> Result<(AnimationLibrary, DemoTextures)> {
    let mut library = AnimationLibrary::new();
    library.register(config.particles.smoke_animation.as_str(), 8, 16)?;
    library.register(config.particles.smoke2_animation.as_str(), 6, 12)?;
    if let Some(fire) = &config.particles.fire_animation {
        library.register(fire.as_str(), 10, 20)?;
    }

    let textures = DemoTextures {
        spark: library.register_bitmap("spark")?,
        explosion: library.register("explosion", 12, 24)?.handle,
    };
    Ok((library, textures))
}

/// Application state.
struct EmberApp {
    config: EngineConfig,
    particles: ParticleSystem<AnimationLibrary>,
    console: DebugConsole,
    objects: SceneObjects,
    camera: PerspectiveCamera,
    renderer: BatchRenderer,
    textures: DemoTextures,
    /// Object the smoke trail is attached to
    orbiter: Option<ObjectIndex>,
    /// Simulated seconds at which the orbiter is destroyed
    orbiter_lifetime: f32,
    sim_time: f32,
    next_emit: f32,
    bursts: u32,
    created: u64,
    detached: usize,
}

impl EmberApp {
    fn new(config: EngineConfig) -> Result<Self> {
        let (library, textures) = build_library(&config)?;

        let mut particles = ParticleSystem::new(config.particles.clone(), library);
        particles.init();
        particles.page_in();
        debug!("{} animations resident", particles.animations().resident().len());

        let mut console = DebugConsole::with_config(config.console.clone());
        for command in &config.startup_commands {
            if !console.execute(command, &mut particles).success {
                console.print_warning(format!("Startup command failed: {command}"));
            }
        }

        let mut objects = SceneObjects::new(MAX_OBJECTS);
        let orbiter = objects.spawn(Self::orbit_transform(0.0));

        let camera = PerspectiveCamera::look_at(
            config.camera_position,
            config.camera_target,
            config.fov_degrees,
            config.aspect_ratio,
            config.near_plane,
            config.far_plane,
        );

        let total_time = config.frames as f32 / config.target_fps as f32;

        Ok(Self {
            orbiter_lifetime: total_time * 0.5,
            config,
            particles,
            console,
            objects,
            camera,
            renderer: BatchRenderer::new(),
            textures,
            orbiter,
            sim_time: 0.0,
            next_emit: 0.0,
            bursts: 0,
            created: 0,
            detached: 0,
        })
    }

    fn orbit_transform(time: f32) -> ObjectTransform {
        let offset = Vec3::new(time.cos(), 0.0, time.sin()) * ORBIT_RADIUS;
        ObjectTransform::new(ORBIT_CENTER + offset, Quat::from_rotation_y(-time))
    }

    /// Fires every demo emitter once.
    fn emit_burst(&mut self) {
        let range = self.config.emitter_range;

        let smoke = ParticleEmitter::default()
            .with_count(4, 8)
            .with_position(Vec3::new(-15.0, 0.0, 50.0))
            .with_normal(Vec3::Y, 0.3)
            .with_life(1.0, 2.0);
        let mut created = self
            .particles
            .emit(&smoke, ParticleType::Smoke, None, range, &self.camera);

        let sparks = ParticleEmitter::default()
            .with_count(10, 20)
            .with_position(Vec3::new(15.0, 5.0, 45.0))
            .with_normal(Vec3::new(0.0, 1.0, -1.0), 0.8)
            .with_life(0.2, 0.6);
        created += self.particles.emit(
            &sparks,
            ParticleType::Bitmap,
            Some(self.textures.spark),
            range,
            &self.camera,
        );

        if self.particles.builtin_loaded(ParticleType::Fire) {
            let fire = ParticleEmitter::default().with_position(Vec3::new(0.0, -5.0, 60.0));
            created += self
                .particles
                .emit(&fire, ParticleType::Fire, None, range, &self.camera);
        }

        let explosion = ParticleInfo::new(
            Vec3::new(5.0, 10.0, 70.0),
            Vec3::ZERO,
            0.0,
            6.0,
            ParticleType::Bitmap,
        )
        .with_texture(self.textures.explosion)
        .with_reverse(self.bursts % 2 == 1);
        created += usize::from(self.particles.create(&explosion).is_some());

        if let Some(orbiter) = self.orbiter {
            let trail = ParticleInfo::new(
                Vec3::new(0.0, 1.0, -2.0),
                Vec3::ZERO,
                3.0,
                1.5,
                ParticleType::Smoke2,
            )
            .attached_to(orbiter, &self.objects);
            let marker = ParticleInfo::new(Vec3::ZERO, Vec3::ZERO, 0.0, 0.5, ParticleType::Debug)
                .attached_to(orbiter, &self.objects);

            for info in [trail, marker].into_iter().flatten() {
                created += usize::from(self.particles.create(&info).is_some());
            }
        }

        self.bursts += 1;
        self.created += created as u64;
        debug!("Burst at {:.2}s created {} particles", self.sim_time, created);
    }

    /// One fixed simulation step.
    fn update(&mut self, dt: f32) {
        self.sim_time += dt;

        if let Some(orbiter) = self.orbiter {
            if self.sim_time >= self.orbiter_lifetime {
                self.objects.despawn(orbiter);
                self.orbiter = None;
                info!(
                    "Orbiter destroyed at {:.2}s ({} objects left)",
                    self.sim_time,
                    self.objects.live_count()
                );
            } else {
                self.objects
                    .set_transform(orbiter, Self::orbit_transform(self.sim_time));
            }
        }

        while self.sim_time >= self.next_emit {
            self.emit_burst();
            self.next_emit += self.config.emit_interval;
        }

        let report = self.particles.move_all(dt, &self.objects);
        self.detached += report.detached;
    }

    fn render(&mut self) {
        self.particles
            .render_all(&self.camera, &self.objects, &mut self.renderer);
        debug_assert_eq!(self.renderer.pending(), 0);
    }

    fn shutdown(&mut self) -> RunSummary {
        let report = self.console.execute("particle_stats", &mut self.particles);
        for line in &report.output {
            debug!("{}", line.text);
        }

        let stats = self.particles.stats();
        let counters = self.renderer.counters();
        info!(
            "Renderer: {} draw calls, {} billboards, {} bytes, {} wire spheres (last batch {} bytes)",
            counters.draw_calls,
            counters.instances,
            counters.uploaded_bytes,
            counters.wire_spheres,
            self.renderer.last_batch().len()
        );

        self.particles.close();

        RunSummary {
            frames: self.config.frames,
            created: self.created,
            peak: stats.high_water_mark,
            draw_calls: counters.draw_calls,
            detached: self.detached,
        }
    }
}

/// Run the simulation for the configured number of frames.
pub fn run(config: EngineConfig) -> Result<RunSummary> {
    info!(
        "Simulating {} frames at {} fps (physics {} Hz)",
        config.frames, config.target_fps, config.physics_hz
    );

    let frame_dt = 1.0 / config.target_fps as f32;
    let report_every = config.target_fps.max(1);
    let mut timing = FrameTiming::new(config.fixed_dt());
    let mut app = EmberApp::new(config)?;

    for frame in 0..app.config.frames {
        timing.mark_frame();
        for _ in 0..timing.accumulate(frame_dt) {
            app.update(timing.fixed_dt());
        }
        app.render();

        if frame % report_every == 0 {
            let stats = app.particles.stats();
            debug!(
                "frame {}: {} live, {} rendered, {:.3} ms/frame",
                frame,
                stats.live,
                stats.last_render.rendered(),
                timing.average_frame_time_ms()
            );
        }
    }

    timing.reset();
    Ok(app.shutdown())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_particles::AnimationService;

    fn test_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.frames = 120;
        config.startup_commands.clear();
        config.console.echo_to_log = false;
        config.particles.seed = Some(99);
        config.validate();
        config
    }

    #[test]
    fn test_run_produces_particles_and_draws() {
        let summary = run(test_config()).expect("run");
        assert_eq!(summary.frames, 120);
        assert!(summary.created > 0);
        assert!(summary.peak > 0);
        assert!(summary.draw_calls > 0);
    }

    #[test]
    fn test_destroyed_orbiter_detaches_trail() {
        let summary = run(test_config()).expect("run");
        // The trail particles outlive the orbiter (3s life vs 2s lifetime).
        assert!(summary.detached > 0);
    }

    #[test]
    fn test_startup_command_disables_particles() {
        let mut config = test_config();
        config.startup_commands = vec!["particles off".to_string()];
        let summary = run(config).expect("run");
        assert_eq!(summary.created, 0);
        assert_eq!(summary.draw_calls, 0);
    }

    #[test]
    fn test_configured_fire_animation_is_used() {
        let mut config = test_config();
        config.particles.fire_animation = Some("fire01".to_string());
        let (mut library, _) = build_library(&config).expect("library");
        assert!(library.load_animation("fire01").is_ok());

        let mut app = EmberApp::new(config).expect("app");
        assert!(app.particles.builtin_loaded(ParticleType::Fire));
        app.update(0.01);
        assert!(app.particles.len() > 0);
    }

    #[test]
    fn test_failed_startup_command_is_reported() {
        let mut config = test_config();
        config.startup_commands = vec!["warp 9".to_string()];
        let app = EmberApp::new(config).expect("app");

        let last = app.console.get_output().back().expect("output");
        assert_eq!(last.level, ember_tools::OutputLevel::Warning);
        assert_eq!(last.text, "Startup command failed: warp 9");
    }

    #[test]
    fn test_orbit_transform_stays_on_circle() {
        for step in 0..8 {
            let transform = EmberApp::orbit_transform(step as f32 * 0.7);
            let distance = transform.position.distance(ORBIT_CENTER);
            assert!((distance - ORBIT_RADIUS).abs() < 1e-3);
        }
    }
}
