//! Batching billboard renderer.
//!
//! Buffers billboards as GPU-ready [`BillboardInstance`] records and
//! "uploads" each batch as one byte slice on flush. Wire spheres bypass
//! the batch.

use bytemuck::{Pod, Zeroable};
use ember_particles::{Billboard, BillboardSink};
use glam::Vec3;
use tracing::trace;

/// GPU-compatible billboard instance.
/// Layout: 32 bytes, matches the instance buffer stride.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BillboardInstance {
    /// Projected position (12 bytes).
    pub position: [f32; 3],
    /// Half-size (4 bytes).
    pub radius: f32,
    /// Texture handle of the frame (4 bytes).
    pub frame: u32,
    /// Variant in 0..8 (4 bytes).
    pub variant: u32,
    /// Blend alpha (4 bytes).
    pub alpha: f32,
    /// Padding (4 bytes).
    padding: u32,
}

impl From<&Billboard> for BillboardInstance {
    fn from(billboard: &Billboard) -> Self {
        Self {
            position: billboard.position.to_array(),
            radius: billboard.radius,
            frame: billboard.frame.raw(),
            variant: u32::from(billboard.variant),
            alpha: billboard.alpha,
            padding: 0,
        }
    }
}

/// Counters accumulated across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawCounters {
    /// Batched draw calls issued
    pub draw_calls: u64,
    /// Billboards drawn through batches
    pub instances: u64,
    /// Bytes handed to the instance buffer
    pub uploaded_bytes: u64,
    /// Immediate wire spheres drawn
    pub wire_spheres: u64,
}

/// In-memory batching renderer.
#[derive(Debug, Default)]
pub struct BatchRenderer {
    pending: Vec<BillboardInstance>,
    last_batch: Vec<u8>,
    counters: DrawCounters,
}

impl BatchRenderer {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Billboards buffered but not yet flushed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Raw bytes of the most recent flushed batch.
    #[must_use]
    pub fn last_batch(&self) -> &[u8] {
        &self.last_batch
    }

    /// Totals since creation.
    #[must_use]
    pub fn counters(&self) -> DrawCounters {
        self.counters
    }
}

impl BillboardSink for BatchRenderer {
    fn submit_billboard(&mut self, billboard: Billboard) {
        self.pending.push(BillboardInstance::from(&billboard));
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let bytes: &[u8] = bytemuck::cast_slice(&self.pending);
        self.last_batch.clear();
        self.last_batch.extend_from_slice(bytes);

        self.counters.draw_calls += 1;
        self.counters.instances += self.pending.len() as u64;
        self.counters.uploaded_bytes += bytes.len() as u64;
        trace!("Flushed {} billboards ({} bytes)", self.pending.len(), bytes.len());

        self.pending.clear();
    }

    fn draw_wire_sphere(&mut self, position: Vec3, radius: f32) {
        trace!("Wire sphere at {position} r={radius}");
        self.counters.wire_spheres += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::TextureHandle;

    fn billboard(frame: u32) -> Billboard {
        Billboard {
            frame: TextureHandle::new(frame),
            position: Vec3::new(0.5, -0.5, 20.0),
            variant: 3,
            radius: 1.5,
            alpha: 0.75,
        }
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<BillboardInstance>(), 32);
        let instance = BillboardInstance::from(&billboard(7));
        assert_eq!(instance.frame, 7);
        assert_eq!(instance.variant, 3);
        assert_eq!(instance.position, [0.5, -0.5, 20.0]);
    }

    #[test]
    fn test_flush_uploads_one_batch() {
        let mut renderer = BatchRenderer::new();
        renderer.submit_billboard(billboard(1));
        renderer.submit_billboard(billboard(2));
        assert_eq!(renderer.pending(), 2);

        renderer.flush();
        assert_eq!(renderer.pending(), 0);
        assert_eq!(renderer.last_batch().len(), 64);

        let second: BillboardInstance = bytemuck::pod_read_unaligned(&renderer.last_batch()[32..]);
        assert_eq!(second.frame, 2);

        let counters = renderer.counters();
        assert_eq!(counters.draw_calls, 1);
        assert_eq!(counters.instances, 2);
        assert_eq!(counters.uploaded_bytes, 64);
    }

    #[test]
    fn test_empty_flush_is_not_a_draw() {
        let mut renderer = BatchRenderer::new();
        renderer.flush();
        assert_eq!(renderer.counters().draw_calls, 0);
    }

    #[test]
    fn test_wire_spheres_bypass_batch() {
        let mut renderer = BatchRenderer::new();
        renderer.draw_wire_sphere(Vec3::ZERO, 1.0);
        assert_eq!(renderer.pending(), 0);
        assert_eq!(renderer.counters().wire_spheres, 1);
    }
}
