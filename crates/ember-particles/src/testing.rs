//! Test doubles for the external collaborators.

#![allow(missing_docs)]

use ember_common::{ObjectIndex, ObjectTransform, Signature};
use glam::Vec3;

use crate::attachment::ObjectTable;
use crate::render::{Billboard, BillboardSink, View};

/// Fixed-size object table with recyclable slots.
#[derive(Debug, Clone)]
pub struct FakeObjects {
    slots: Vec<Option<(Signature, ObjectTransform)>>,
    next_signature: u32,
}

impl FakeObjects {
    pub fn new(max_objects: usize) -> Self {
        Self {
            slots: vec![None; max_objects],
            next_signature: 1,
        }
    }

    /// Occupies the first free slot.
    pub fn spawn(&mut self, transform: ObjectTransform) -> ObjectIndex {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .expect("object table full");
        self.slots[index] = Some((Signature::new(self.next_signature), transform));
        self.next_signature += 1;
        ObjectIndex::new(index as u32)
    }

    pub fn destroy(&mut self, index: ObjectIndex) {
        self.slots[index.as_usize()] = None;
    }

    pub fn set_transform(&mut self, index: ObjectIndex, transform: ObjectTransform) {
        if let Some((_, current)) = self.slots[index.as_usize()].as_mut() {
            *current = transform;
        }
    }
}

impl ObjectTable for FakeObjects {
    fn max_objects(&self) -> usize {
        self.slots.len()
    }

    fn signature(&self, index: ObjectIndex) -> Option<Signature> {
        self.slots
            .get(index.as_usize())
            .and_then(|slot| slot.map(|(signature, _)| signature))
    }

    fn transform(&self, index: ObjectIndex) -> Option<ObjectTransform> {
        self.slots
            .get(index.as_usize())
            .and_then(|slot| slot.map(|(_, transform)| transform))
    }
}

/// Eye at a fixed point with a simple perspective divide.
#[derive(Debug, Clone, Copy)]
pub struct FakeView {
    pub eye: Vec3,
    pub forward: Vec3,
    pub max_depth: f32,
}

impl FakeView {
    /// Eye at the origin looking down +Z.
    pub fn looking_down_z() -> Self {
        Self {
            eye: Vec3::ZERO,
            forward: Vec3::Z,
            max_depth: 1000.0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: f32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl View for FakeView {
    fn eye_position(&self) -> Vec3 {
        self.eye
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn project(&self, world: Vec3) -> Option<Vec3> {
        let rel = world - self.eye;
        let depth = rel.dot(self.forward);
        if depth <= 0.1 || depth > self.max_depth {
            return None;
        }
        Some(Vec3::new(rel.x / depth, rel.y / depth, depth))
    }
}

/// Records every draw call.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub billboards: Vec<Billboard>,
    pub spheres: Vec<(Vec3, f32)>,
    pub flushes: usize,
}

impl BillboardSink for RecordingSink {
    fn submit_billboard(&mut self, billboard: Billboard) {
        self.billboards.push(billboard);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn draw_wire_sphere(&mut self, position: Vec3, radius: f32) {
        self.spheres.push((position, radius));
    }
}
