//! Per-frame particle monitors.

use crate::lifecycle::SweepReport;
use crate::render::RenderStats;

/// Snapshot of the particle system's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticleStats {
    /// Live particles right now.
    pub live: usize,
    /// Peak live particles since the last reset.
    pub high_water_mark: usize,
    /// Result of the last lifecycle sweep.
    pub last_sweep: SweepReport,
    /// Result of the last render pass.
    pub last_render: RenderStats,
    /// Particles created since the last reset.
    pub created: u64,
    /// Creation requests refused since the last reset.
    pub refused: u64,
}

impl ParticleStats {
    /// Human readable summary lines, one counter per line.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("live particles: {}", self.live),
            format!("high water mark: {}", self.high_water_mark),
            format!(
                "last sweep: {} considered, {} expired, {} detached",
                self.last_sweep.considered, self.last_sweep.expired, self.last_sweep.detached
            ),
            format!(
                "last render: {} submitted, {} debug, {} culled",
                self.last_render.submitted,
                self.last_render.debug_drawn,
                self.last_render.considered.saturating_sub(self.last_render.rendered())
            ),
            format!("created: {}, refused: {}", self.created, self.refused),
        ]
    }
}
