//! Scene objects and camera.
//!
//! [`SceneObjects`] is the host's object table: fixed slots that are
//! recycled, each occupancy stamped with a fresh signature so particles
//! can tell a reused slot from the object they were attached to.

use ember_common::{ObjectIndex, ObjectTransform, Signature};
use ember_particles::{ObjectTable, View};
use glam::{Mat4, Vec3, Vec4Swizzles};
use tracing::debug;

/// One live scene object.
#[derive(Debug, Clone, Copy)]
struct SceneObject {
    signature: Signature,
    transform: ObjectTransform,
}

/// Fixed-capacity scene object table.
#[derive(Debug, Clone)]
pub struct SceneObjects {
    slots: Vec<Option<SceneObject>>,
    next_signature: u32,
}

impl SceneObjects {
    /// Creates a table with `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            next_signature: 1,
        }
    }

    /// Places an object in the first free slot.
    pub fn spawn(&mut self, transform: ObjectTransform) -> Option<ObjectIndex> {
        let index = self.slots.iter().position(Option::is_none)?;
        let signature = Signature::new(self.next_signature);
        self.next_signature = self.next_signature.wrapping_add(1).max(1);
        self.slots[index] = Some(SceneObject {
            signature,
            transform,
        });

        debug!("Spawned object {} with signature {}", index, signature.raw());
        Some(ObjectIndex::new(index as u32))
    }

    /// Frees an object's slot.
    pub fn despawn(&mut self, index: ObjectIndex) -> bool {
        self.slots
            .get_mut(index.as_usize())
            .and_then(Option::take)
            .is_some()
    }

    /// Moves a live object.
    pub fn set_transform(&mut self, index: ObjectIndex, transform: ObjectTransform) {
        if let Some(Some(object)) = self.slots.get_mut(index.as_usize()) {
            object.transform = transform;
        }
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl ObjectTable for SceneObjects {
    fn max_objects(&self) -> usize {
        self.slots.len()
    }

    fn signature(&self, index: ObjectIndex) -> Option<Signature> {
        self.slots.get(index.as_usize())?.map(|object| object.signature)
    }

    fn transform(&self, index: ObjectIndex) -> Option<ObjectTransform> {
        self.slots.get(index.as_usize())?.map(|object| object.transform)
    }
}

/// Perspective camera.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    position: Vec3,
    forward: Vec3,
    view_proj: Mat4,
}

impl PerspectiveCamera {
    /// Creates a camera at `position` looking at `target`.
    ///
    /// A target equal to the position looks down +Z.
    #[must_use]
    pub fn look_at(
        position: Vec3,
        target: Vec3,
        fov_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let forward = (target - position).try_normalize().unwrap_or(Vec3::Z);
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };

        let view = Mat4::look_to_rh(position, forward, up);
        let proj = Mat4::perspective_rh(fov_degrees.to_radians(), aspect_ratio, near, far);

        Self {
            position,
            forward,
            view_proj: proj * view,
        }
    }
}

impl View for PerspectiveCamera {
    fn eye_position(&self) -> Vec3 {
        self.position
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Normalized device x/y plus view depth.
    fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        let on_screen = ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z);
        on_screen.then(|| Vec3::new(ndc.x, ndc.y, clip.w))
    }
}
