//! Frame timing.
//!
//! Provides fixed-timestep accumulation for the particle simulation and
//! wall-clock frame time tracking for the performance log.

use std::collections::VecDeque;
use std::time::Instant;

/// Maximum fixed updates per frame before the accumulator is dropped.
const MAX_UPDATES_PER_FRAME: u32 = 10;

/// Frame timing manager.
#[derive(Debug)]
pub struct FrameTiming {
    /// Time of last frame start
    last_frame: Instant,
    /// Accumulator for fixed timestep
    accumulator: f32,
    /// Fixed timestep delta
    fixed_dt: f32,
    /// Recent wall-clock frame times for averaging
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl FrameTiming {
    /// Create a timing manager stepping the simulation at `fixed_dt`.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            accumulator: 0.0,
            fixed_dt: fixed_dt.max(0.001),
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Records the wall-clock time since the previous call.
    pub fn mark_frame(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }

        dt
    }

    /// Accumulate time for fixed timestep updates.
    /// Returns the number of fixed updates that should be performed.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_UPDATES_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // If we're still behind, reset accumulator
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Get the average frame time in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        (self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32) * 1000.0
    }

    /// Reset timing (call after a level change).
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.accumulator = 0.0;
        self.frame_times.clear();
    }
}
