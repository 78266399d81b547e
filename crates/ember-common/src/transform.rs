//! World transform of a scene object.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a scene object in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectTransform {
    /// World position
    pub position: Vec3,
    /// World orientation
    pub orientation: Quat,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ObjectTransform {
    /// Transform at the origin with no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    /// Creates a transform from a position and orientation.
    #[must_use]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Maps an offset expressed in the object's local frame to world space.
    #[must_use]
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.orientation * local + self.position
    }
}
