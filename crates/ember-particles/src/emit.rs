//! Stochastic bulk emission.
//!
//! An emission call turns a [`ParticleEmitter`] description into a random
//! number of particles. The count scales with the detail level and drops
//! off for emitters far from the camera.

use glam::Vec3;

/// Distance (in `range` units) beyond which emission thins out.
pub const FALLOFF_DISTANCE: f32 = 125.0;

/// Direction used when the perturbed emission normal degenerates.
pub const FALLBACK_DIRECTION: Vec3 = Vec3::X;

/// Description of a batch of particles to spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleEmitter {
    /// Lowest number of particles to create
    pub num_low: u32,
    /// Highest number of particles to create
    pub num_high: u32,
    /// Where the particles emit from
    pub position: Vec3,
    /// Initial velocity shared by all particles
    pub velocity: Vec3,
    /// Shortest particle lifetime
    pub min_life: f32,
    /// Longest particle lifetime
    pub max_life: f32,
    /// Direction the particles emit around
    pub normal: Vec3,
    /// Spread around the normal (0 = tight, 1 = all directions)
    pub normal_variance: f32,
    /// Slowest particle speed along the perturbed normal
    pub min_vel: f32,
    /// Fastest particle speed along the perturbed normal
    pub max_vel: f32,
    /// Smallest particle radius
    pub min_rad: f32,
    /// Largest particle radius
    pub max_rad: f32,
}

impl Default for ParticleEmitter {
    fn default() -> Self {
        Self {
            num_low: 5,
            num_high: 10,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            min_life: 0.5,
            max_life: 1.5,
            normal: Vec3::Y,
            normal_variance: 0.3,
            min_vel: 1.0,
            max_vel: 4.0,
            min_rad: 0.5,
            max_rad: 1.0,
        }
    }
}

impl ParticleEmitter {
    /// Sets the particle count range.
    #[must_use]
    pub const fn with_count(mut self, low: u32, high: u32) -> Self {
        self.num_low = low;
        self.num_high = high;
        self
    }

    /// Sets the emission position.
    #[must_use]
    pub const fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the emission normal and spread.
    #[must_use]
    pub const fn with_normal(mut self, normal: Vec3, variance: f32) -> Self {
        self.normal = normal;
        self.normal_variance = variance;
        self
    }

    /// Sets the lifetime range.
    #[must_use]
    pub const fn with_life(mut self, min: f32, max: f32) -> Self {
        self.min_life = min;
        self.max_life = max;
        self
    }
}

/// Emission percentage for a detail level: 0, 50, 75, 100, 125, ...
#[must_use]
pub const fn detail_percent(level: u32) -> u32 {
    if level == 0 {
        return 0;
    }
    50 + 25 * (level - 1)
}

/// Thins `percent` for emitters beyond [`FALLOFF_DISTANCE`].
///
/// `distance` is already normalized by the caller's range. Returns `None`
/// when the result falls below 1%.
#[must_use]
pub fn distance_scaled_percent(percent: u32, distance: f32) -> Option<u32> {
    if distance <= FALLOFF_DISTANCE {
        return Some(percent);
    }
    let scaled = (percent as f32 * FALLOFF_DISTANCE / distance) as u32;
    (scaled >= 1).then_some(scaled)
}

/// `count * percent / 100`, saturating at `u32::MAX`.
const fn scale_count(count: u32, percent: u32) -> u32 {
    let scaled = count as u64 * percent as u64 / 100;
    if scaled > u32::MAX as u64 {
        u32::MAX
    } else {
        scaled as u32
    }
}

/// Inclusive count range after applying `percent`.
///
/// A reversed range collapses to its lower bound.
#[must_use]
pub const fn count_bounds(num_low: u32, num_high: u32, percent: u32) -> (u32, u32) {
    let low = scale_count(num_low, percent);
    let high = scale_count(num_high, percent);
    if high < low {
        (low, low)
    } else {
        (low, high)
    }
}

/// Random attributes of one emitted particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmittedParticle {
    /// Billboard half-size
    pub radius: f32,
    /// Lifetime in seconds
    pub lifetime: f32,
    /// Initial velocity
    pub velocity: Vec3,
}

fn lerp_random(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    (max - min) * rng.f32() + min
}

/// Draws the attributes of one particle from the emitter's ranges.
pub fn sample_particle(emitter: &ParticleEmitter, rng: &mut fastrand::Rng) -> EmittedParticle {
    let radius = lerp_random(rng, emitter.min_rad, emitter.max_rad);
    let speed = lerp_random(rng, emitter.min_vel, emitter.max_vel);
    let lifetime = lerp_random(rng, emitter.min_life, emitter.max_life);

    let variance = emitter.normal_variance;
    let jitter = Vec3::new(
        (rng.f32() * 2.0 - 1.0) * variance,
        (rng.f32() * 2.0 - 1.0) * variance,
        (rng.f32() * 2.0 - 1.0) * variance,
    );
    let direction = (emitter.normal + jitter)
        .try_normalize()
        .unwrap_or(FALLBACK_DIRECTION);

    EmittedParticle {
        radius,
        lifetime,
        velocity: emitter.velocity + direction * speed,
    }
}

/// Number of particles one emission should produce.
///
/// `distance` is the emitter's distance from the eye divided by `range`.
/// Returns 0 when the detail level, distance or count range rule the
/// emission out.
pub fn emission_count(
    emitter: &ParticleEmitter,
    detail_level: u32,
    distance: f32,
    rng: &mut fastrand::Rng,
) -> u32 {
    let Some(percent) = distance_scaled_percent(detail_percent(detail_level), distance) else {
        return 0;
    };
    let (low, high) = count_bounds(emitter.num_low, emitter.num_high, percent);
    rng.u32(low..=high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_detail_percent_scale() {
        assert_eq!(detail_percent(0), 0);
        assert_eq!(detail_percent(1), 50);
        assert_eq!(detail_percent(2), 75);
        assert_eq!(detail_percent(3), 100);
        for level in 1..8 {
            assert_eq!(detail_percent(level + 1) - detail_percent(level), 25);
        }
    }

    #[test]
    fn test_distance_scaling() {
        assert_eq!(distance_scaled_percent(100, 10.0), Some(100));
        assert_eq!(distance_scaled_percent(100, FALLOFF_DISTANCE), Some(100));
        assert_eq!(distance_scaled_percent(100, 250.0), Some(50));
        assert_eq!(distance_scaled_percent(100, 20_000.0), None);
        assert_eq!(distance_scaled_percent(0, 500.0), None);
    }

    #[test]
    fn test_count_bounds() {
        assert_eq!(count_bounds(10, 20, 100), (10, 20));
        assert_eq!(count_bounds(10, 20, 50), (5, 10));
        assert_eq!(count_bounds(1, 1, 50), (0, 0));
        assert_eq!(count_bounds(20, 10, 100), (20, 20));
    }

    #[test]
    fn test_count_bounds_large_emitter() {
        let percent = detail_percent(8);
        assert_eq!(percent, 225);
        assert_eq!(
            count_bounds(20_000_000, 30_000_000, percent),
            (45_000_000, 67_500_000)
        );
        assert_eq!(count_bounds(u32::MAX, u32::MAX, percent), (u32::MAX, u32::MAX));
    }

    #[test]
    fn test_zero_detail_emits_nothing() {
        let mut rng = fastrand::Rng::with_seed(7);
        let emitter = ParticleEmitter::default().with_count(10, 20);
        assert_eq!(emission_count(&emitter, 0, 1.0, &mut rng), 0);
    }

    #[test]
    fn test_degenerate_direction_falls_back() {
        let mut rng = fastrand::Rng::with_seed(1);
        let emitter = ParticleEmitter {
            normal: Vec3::ZERO,
            normal_variance: 0.0,
            min_vel: 2.0,
            max_vel: 2.0,
            ..Default::default()
        };
        let sample = sample_particle(&emitter, &mut rng);
        assert!(sample.velocity.is_finite());
        assert_eq!(sample.velocity, FALLBACK_DIRECTION * 2.0);
    }

    #[test]
    fn test_zero_variance_follows_normal() {
        let mut rng = fastrand::Rng::with_seed(3);
        let emitter = ParticleEmitter {
            velocity: Vec3::new(0.0, 0.0, 1.0),
            normal: Vec3::new(0.0, 10.0, 0.0),
            normal_variance: 0.0,
            min_vel: 3.0,
            max_vel: 3.0,
            ..Default::default()
        };
        let sample = sample_particle(&emitter, &mut rng);
        assert!((sample.velocity - Vec3::new(0.0, 3.0, 1.0)).length() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_emission_count_within_bounds(
            low in 0_u32..200,
            extra in 0_u32..200,
            level in 1_u32..6,
            seed in any::<u64>(),
        ) {
            let mut rng = fastrand::Rng::with_seed(seed);
            let emitter = ParticleEmitter::default().with_count(low, low + extra);
            let percent = detail_percent(level);
            let count = emission_count(&emitter, level, 1.0, &mut rng);
            prop_assert!(count >= low * percent / 100);
            prop_assert!(count <= (low + extra) * percent / 100);
        }

        #[test]
        fn prop_samples_within_ranges(seed in any::<u64>()) {
            let mut rng = fastrand::Rng::with_seed(seed);
            let emitter = ParticleEmitter::default();
            let sample = sample_particle(&emitter, &mut rng);
            prop_assert!(sample.radius >= emitter.min_rad && sample.radius <= emitter.max_rad);
            prop_assert!(sample.lifetime >= emitter.min_life && sample.lifetime <= emitter.max_life);
            let speed = (sample.velocity - emitter.velocity).length();
            prop_assert!(speed >= emitter.min_vel - 1e-4 && speed <= emitter.max_vel + 1e-4);
        }
    }
}
