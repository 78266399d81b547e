//! Camera-facing billboard submission.
//!
//! The renderer only reads particle state. Each visible particle becomes a
//! [`Billboard`] for the batched draw collaborator, except debug particles
//! which draw an immediate wire sphere.

use ember_common::TextureHandle;
use glam::Vec3;
use tracing::trace_span;

use crate::attachment::{world_position, ObjectTable};
use crate::particle::ParticleType;
use crate::resources::AnimationService;
use crate::store::ParticleStore;
use crate::visual::{current_alpha, display_frame};

/// Camera and projection service.
pub trait View {
    /// Eye position in world space.
    fn eye_position(&self) -> Vec3;

    /// Unit forward vector in world space.
    fn forward(&self) -> Vec3;

    /// Projects a world position into view space.
    ///
    /// Returns `None` when the point falls outside the view volume.
    fn project(&self, world: Vec3) -> Option<Vec3>;
}

/// One buffered billboard draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Billboard {
    /// Texture of the frame to draw.
    pub frame: TextureHandle,
    /// Projected position.
    pub position: Vec3,
    /// Sub-variant selector in `0..8`.
    pub variant: u8,
    /// Billboard half-size.
    pub radius: f32,
    /// Blend alpha.
    pub alpha: f32,
}

/// Batched draw collaborator.
pub trait BillboardSink {
    /// Buffers one billboard.
    fn submit_billboard(&mut self, billboard: Billboard);

    /// Issues every buffered billboard as one draw.
    fn flush(&mut self);

    /// Draws a wireframe sphere immediately, bypassing the batch.
    fn draw_wire_sphere(&mut self, position: Vec3, radius: f32);
}

/// Counters from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Particles examined.
    pub considered: usize,
    /// Skipped because the attached object no longer resolves.
    pub unresolved: usize,
    /// Skipped because they are behind the camera.
    pub back_facing: usize,
    /// Skipped because they faded to zero alpha.
    pub transparent: usize,
    /// Skipped because projection rejected them.
    pub off_screen: usize,
    /// Billboards submitted to the batch.
    pub submitted: usize,
    /// Debug spheres drawn.
    pub debug_drawn: usize,
    /// Whether the batch was flushed.
    pub flushed: bool,
}

impl RenderStats {
    /// Particles that produced a draw.
    #[must_use]
    pub const fn rendered(&self) -> usize {
        self.submitted + self.debug_drawn
    }
}

/// Draws every live particle.
///
/// The batch is flushed once at the end if anything was submitted to it.
pub fn render_particles(
    store: &ParticleStore,
    view: &impl View,
    objects: &impl ObjectTable,
    animations: &impl AnimationService,
    sink: &mut impl BillboardSink,
) -> RenderStats {
    let _span = trace_span!("particles_render_all", count = store.len()).entered();

    let eye = view.eye_position();
    let forward = view.forward();
    let mut stats = RenderStats::default();

    for particle in store {
        stats.considered += 1;

        let Some(position) = world_position(particle, objects) else {
            stats.unresolved += 1;
            continue;
        };

        if forward.dot(position - eye) <= 0.0 {
            stats.back_facing += 1;
            continue;
        }

        let alpha = current_alpha(eye, position);
        if alpha <= 0.0 {
            stats.transparent += 1;
            continue;
        }

        let Some(projected) = view.project(position) else {
            stats.off_screen += 1;
            continue;
        };

        let frame = display_frame(particle, animations);

        if particle.kind == ParticleType::Debug {
            sink.draw_wire_sphere(position, particle.radius);
            stats.debug_drawn += 1;
            continue;
        }

        let Some(texture) = particle.texture else {
            continue;
        };
        debug_assert!(frame < particle.frame_count);

        sink.submit_billboard(Billboard {
            frame: texture.frame(frame),
            position: projected,
            variant: particle.variant(),
            radius: particle.radius,
            alpha,
        });
        stats.submitted += 1;
    }

    if stats.submitted > 0 {
        sink.flush();
        stats.flushed = true;
    }

    stats
}
