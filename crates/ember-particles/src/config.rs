//! Particle runtime configuration.

use serde::{Deserialize, Serialize};

/// Highest supported detail level.
pub const MAX_DETAIL_LEVEL: u32 = 8;

/// Default detail level (100% emission).
pub const DEFAULT_DETAIL_LEVEL: u32 = 3;

/// Default store capacity reserved up front.
pub const DEFAULT_CAPACITY: usize = 2048;

/// Runtime configuration for the particle system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Initial state of the global enable flag
    pub enabled: bool,
    /// Initial detail level (0 disables emission)
    pub detail_level: u32,
    /// Seed for emission randomness (None = random)
    pub seed: Option<u64>,
    /// Particles reserved up front
    pub initial_capacity: usize,
    /// Animation backing fire particles (None = fire unavailable)
    pub fire_animation: Option<String>,
    /// Animation backing smoke particles
    pub smoke_animation: String,
    /// Animation backing secondary smoke particles
    pub smoke2_animation: String,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            detail_level: DEFAULT_DETAIL_LEVEL,
            seed: None,
            initial_capacity: DEFAULT_CAPACITY,
            fire_animation: None,
            smoke_animation: "particlesmoke01".to_string(),
            smoke2_animation: "particlesmoke02".to_string(),
        }
    }
}

impl ParticleConfig {
    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.detail_level = self.detail_level.min(MAX_DETAIL_LEVEL);
        self.initial_capacity = self.initial_capacity.clamp(16, 1 << 20);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParticleConfig::default();
        assert!(config.enabled);
        assert_eq!(config.detail_level, 3);
        assert_eq!(config.smoke_animation, "particlesmoke01");
        assert_eq!(config.fire_animation, None);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ParticleConfig {
            detail_level: 40,
            initial_capacity: 0,
            ..Default::default()
        };
        config.validate();
        assert_eq!(config.detail_level, MAX_DETAIL_LEVEL);
        assert_eq!(config.initial_capacity, 16);
    }
}
