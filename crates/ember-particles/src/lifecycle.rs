//! Per-frame aging, expiry and integration.

use crate::attachment::{attachment_is_valid, ObjectTable};
use crate::particle::Particle;
use crate::store::{ParticleStore, Sweep};

/// Age assigned on a particle's first tick, marking it as seen.
pub const FIRST_TICK_AGE: f32 = 0.00001;

/// Outcome of advancing a single particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    /// Still alive; position integrated.
    Alive,
    /// Lifetime exceeded.
    Expired,
    /// Attached object destroyed or out of range.
    Detached,
}

/// Counters from one lifecycle sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Particles visited.
    pub considered: usize,
    /// Particles removed because their lifetime ran out.
    pub expired: usize,
    /// Particles removed because their attachment went stale.
    pub detached: usize,
}

impl SweepReport {
    /// Total particles removed.
    #[must_use]
    pub const fn removed(&self) -> usize {
        self.expired + self.detached
    }
}

/// Ages one particle and decides whether it survives the frame.
///
/// A zero-lifetime particle survives its first tick so it renders exactly
/// once, and is removed on the next one.
pub fn advance(particle: &mut Particle, frametime: f32, objects: &impl ObjectTable) -> Fate {
    let first_tick = particle.age == 0.0;
    if first_tick {
        particle.age = FIRST_TICK_AGE;
    } else {
        particle.age += frametime;
    }

    let render_once = first_tick && particle.max_life <= 0.0;
    if particle.age > particle.max_life && !render_once {
        return Fate::Expired;
    }

    if let Some(attachment) = &particle.attachment {
        if !attachment_is_valid(attachment, objects) {
            return Fate::Detached;
        }
    }

    particle.position += particle.velocity * frametime;
    Fate::Alive
}

/// Advances every particle in the store by `frametime` seconds.
///
/// Negative frame times are treated as 0.
pub fn move_particles(
    store: &mut ParticleStore,
    frametime: f32,
    objects: &impl ObjectTable,
) -> SweepReport {
    let frametime = frametime.max(0.0);
    let mut report = SweepReport::default();

    store.sweep(|particle| {
        report.considered += 1;
        match advance(particle, frametime, objects) {
            Fate::Alive => Sweep::Keep,
            Fate::Expired => {
                report.expired += 1;
                Sweep::Remove
            },
            Fate::Detached => {
                report.detached += 1;
                Sweep::Remove
            },
        }
    });

    report
}
