//! Engine configuration.
//!
//! Provides the simulation, camera, console and particle settings of the
//! host. Configuration is read from `ember.toml` (or the file named by
//! `EMBER_CONFIG`) and can be written back out.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ember_common::{ConfigError, EmberResult};
use ember_particles::ParticleConfig;
use ember_tools::ConsoleConfig;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "ember.toml";

/// Environment variable overriding the configuration path.
const CONFIG_ENV: &str = "EMBER_CONFIG";

/// Engine configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Simulation Settings ===
    /// Rendered frames per simulated second
    pub target_fps: u32,
    /// Fixed physics steps per simulated second
    pub physics_hz: u32,
    /// Number of frames to simulate before exiting
    pub frames: u32,
    /// Seconds between two bursts of each demo emitter
    pub emit_interval: f32,
    /// Distance normalization passed to emission
    pub emitter_range: f32,

    // === Camera Settings ===
    /// Eye position
    pub camera_position: Vec3,
    /// Point the camera looks at
    pub camera_target: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Viewport width / height
    pub aspect_ratio: f32,
    /// Near clip distance
    pub near_plane: f32,
    /// Far clip distance
    pub far_plane: f32,

    // === Debug Settings ===
    /// Extra tracing directives, comma separated (e.g. "ember_particles=debug")
    pub log_filter: String,
    /// Console commands run before the first frame
    pub startup_commands: Vec<String>,
    /// Debug console settings
    pub console: ConsoleConfig,

    // === Particle Settings ===
    /// Particle system settings
    pub particles: ParticleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Simulation
            target_fps: 30,
            physics_hz: 60,
            frames: 300,
            emit_interval: 0.5,
            emitter_range: 1.0,

            // Camera
            camera_position: Vec3::new(0.0, 10.0, -60.0),
            camera_target: Vec3::ZERO,
            fov_degrees: 70.0,
            aspect_ratio: 16.0 / 9.0,
            near_plane: 0.5,
            far_plane: 1000.0,

            // Debug
            log_filter: String::new(),
            startup_commands: vec!["particle_stats".to_string()],
            console: ConsoleConfig::default(),

            particles: ParticleConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Configuration path: `EMBER_CONFIG` if set, else `ember.toml`.
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
    }

    /// Parses a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads a configuration file without logging.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn read<P: AsRef<Path>>(path: P) -> EmberResult<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(Self::from_toml_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolves the outcome of [`read`](Self::read), falling back to
    /// defaults and logging why.
    pub fn finish_load(path: &Path, result: EmberResult<Option<Self>>) -> Self {
        match result {
            Ok(Some(config)) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Ok(None) => {
                info!("Config file not found, using defaults");
                Self::default()
            },
            Err(e) => {
                warn!("Failed to load config file {}: {e}", path.display());
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> EmberResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Simulation
        self.target_fps = self.target_fps.clamp(1, 240);
        self.physics_hz = self.physics_hz.clamp(1, 1000);
        if !(self.emit_interval.is_finite() && self.emit_interval > 0.0) {
            self.emit_interval = 0.5;
        }
        if !(self.emitter_range.is_finite() && self.emitter_range > 0.0) {
            self.emitter_range = 1.0;
        }

        // Camera
        self.fov_degrees = self.fov_degrees.clamp(10.0, 170.0);
        self.aspect_ratio = self.aspect_ratio.clamp(0.25, 4.0);
        self.near_plane = self.near_plane.max(0.01);
        self.far_plane = self.far_plane.max(self.near_plane + 1.0);

        self.particles.validate();
    }

    /// Fixed physics timestep in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.physics_hz as f32
    }
}
