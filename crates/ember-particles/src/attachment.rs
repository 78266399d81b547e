//! Attachment validation against the scene's object table.
//!
//! Particles may ride along with a scene object. The object can be destroyed
//! and its slot reused at any time, so every access goes through
//! [`attachment_is_valid`] first.

use ember_common::{ObjectIndex, ObjectTransform, Signature};
use glam::Vec3;

use crate::particle::{Attachment, Particle};

/// Read access to the scene's object table.
pub trait ObjectTable {
    /// Number of slots in the table.
    fn max_objects(&self) -> usize;

    /// Live signature of the object in `index`, or `None` for an empty or
    /// out-of-range slot.
    fn signature(&self, index: ObjectIndex) -> Option<Signature>;

    /// World transform of the object in `index`.
    fn transform(&self, index: ObjectIndex) -> Option<ObjectTransform>;
}

/// Returns `true` when the attached object still exists.
///
/// Invalid when the index is outside the table or the slot's live signature
/// differs from the captured one.
#[must_use]
pub fn attachment_is_valid(attachment: &Attachment, objects: &impl ObjectTable) -> bool {
    if attachment.object.as_usize() >= objects.max_objects() {
        return false;
    }
    objects.signature(attachment.object) == Some(attachment.signature)
}

/// Resolves a particle's world position.
///
/// Attached particles store an offset in the object's local frame. Returns
/// `None` when the attachment no longer resolves.
#[must_use]
pub fn world_position(particle: &Particle, objects: &impl ObjectTable) -> Option<Vec3> {
    match &particle.attachment {
        None => Some(particle.position),
        Some(attachment) => {
            if !attachment_is_valid(attachment, objects) {
                return None;
            }
            objects
                .transform(attachment.object)
                .map(|transform| transform.local_to_world(particle.position))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{ParticleInfo, ParticleType};
    use crate::testing::FakeObjects;
    use glam::Quat;

    #[test]
    fn test_valid_while_signature_matches() {
        let mut objects = FakeObjects::new(4);
        let slot = objects.spawn(ObjectTransform::IDENTITY);
        let attachment = Attachment::new(slot, objects.signature(slot).expect("live slot"));

        assert!(attachment_is_valid(&attachment, &objects));

        objects.destroy(slot);
        assert!(!attachment_is_valid(&attachment, &objects));
    }

    #[test]
    fn test_invalid_after_slot_reuse() {
        let mut objects = FakeObjects::new(1);
        let slot = objects.spawn(ObjectTransform::IDENTITY);
        let attachment = Attachment::new(slot, objects.signature(slot).expect("live slot"));

        objects.destroy(slot);
        let reused = objects.spawn(ObjectTransform::IDENTITY);
        assert_eq!(reused, slot);
        assert!(!attachment_is_valid(&attachment, &objects));
    }

    #[test]
    fn test_out_of_range_index_is_invalid() {
        let objects = FakeObjects::new(2);
        let attachment = Attachment::new(ObjectIndex::new(2), Signature::new(1));
        assert!(!attachment_is_valid(&attachment, &objects));
    }

    #[test]
    fn test_world_position_follows_object() {
        let mut objects = FakeObjects::new(2);
        let slot = objects.spawn(ObjectTransform::new(
            Vec3::new(0.0, 5.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::PI),
        ));
        let info = ParticleInfo::new(Vec3::X, Vec3::ZERO, 1.0, 1.0, ParticleType::Debug)
            .attached_to(slot, &objects)
            .expect("live object");
        let particle = Particle::from_info(&info);

        let world = world_position(&particle, &objects).expect("attached object alive");
        assert!((world - Vec3::new(-1.0, 5.0, 0.0)).length() < 1e-5);

        objects.destroy(slot);
        assert_eq!(world_position(&particle, &objects), None);
    }

    #[test]
    fn test_unattached_uses_stored_position() {
        let objects = FakeObjects::new(0);
        let info = ParticleInfo::new(Vec3::splat(3.0), Vec3::ZERO, 1.0, 1.0, ParticleType::Debug);
        let particle = Particle::from_info(&info);
        assert_eq!(world_position(&particle, &objects), Some(Vec3::splat(3.0)));
    }
}
