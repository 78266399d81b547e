//! Per-particle visual parameters: distance alpha and animation frame.

use glam::Vec3;

use crate::particle::Particle;
use crate::resources::AnimationService;

/// Distance inside which particles start fading out.
pub const INNER_RADIUS: f32 = 30.0;

/// Distance at which the fade reaches zero.
pub const MAGIC_DISTANCE: f32 = 2.75;

/// Alpha used beyond [`INNER_RADIUS`]. Kept just below 1.0.
pub const MAX_ALPHA: f32 = 0.99999;

/// Faded alpha values below this are culled to 0.
pub const MIN_VISIBLE_ALPHA: f32 = 0.05;

/// Alpha for a particle at `position` seen from `eye`.
///
/// Ramps linearly from 0 at [`MAGIC_DISTANCE`] to [`MAX_ALPHA`] at
/// [`INNER_RADIUS`] so particles fade instead of clipping the viewpoint.
#[must_use]
pub fn current_alpha(eye: Vec3, position: Vec3) -> f32 {
    let dist = eye.distance(position);
    if dist > INNER_RADIUS {
        return MAX_ALPHA;
    }

    let alpha = (MAX_ALPHA / (INNER_RADIUS - MAGIC_DISTANCE) * (dist - MAGIC_DISTANCE)).min(MAX_ALPHA);
    if alpha < MIN_VISIBLE_ALPHA {
        0.0
    } else {
        alpha
    }
}

/// Mirrors a frame index for reverse playback.
///
/// Out-of-range frames clamp to the last frame before mirroring.
#[must_use]
pub const fn playback_frame(frame: u32, frame_count: u32, reverse: bool) -> u32 {
    let last = frame_count.saturating_sub(1);
    let frame = if frame > last { last } else { frame };
    if reverse {
        last - frame
    } else {
        frame
    }
}

/// Frame of the particle's animation to draw this frame.
///
/// Single-frame visuals always draw frame 0.
#[must_use]
pub fn display_frame(particle: &Particle, animations: &impl AnimationService) -> u32 {
    if !particle.is_animated() {
        return 0;
    }
    let Some(texture) = particle.texture else {
        return 0;
    };

    let frame = animations
        .frame_index_for(texture, particle.age, particle.max_life)
        .min(particle.frame_count - 1);
    playback_frame(frame, particle.frame_count, particle.reverse)
}
