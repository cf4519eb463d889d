//! Fixed-step clock.
//!
//! The scheduler feeds wall-clock timestamps at whatever rate it likes;
//! `TickClock` turns the gaps into whole steps of `step_secs` and carries
//! the remainder, so desk time advances in identical increments.

/// Longest single frame gap honored. A resumed process does not replay an
/// unbounded catch-up; the offline credit covers long absences instead.
pub const MAX_FRAME_MS: u64 = 500;

#[derive(Clone, Debug)]
pub struct TickClock {
    step_ms: f64,
    /// Milliseconds not yet consumed as steps.
    carry_ms: f64,
    pub total_steps: u64,
    /// `None` until the first timestamp.
    last_ms: Option<u64>,
}

impl TickClock {
    pub fn new(step_secs: f64) -> Self {
        let step_ms = if step_secs.is_finite() && step_secs > 0.0 {
            step_secs * 1000.0
        } else {
            100.0
        };
        Self {
            step_ms,
            carry_ms: 0.0,
            total_steps: 0,
            last_ms: None,
        }
    }

    pub fn step_secs(&self) -> f64 {
        self.step_ms / 1000.0
    }

    /// Feed a timestamp; returns how many steps to run now.
    /// The first call only anchors the clock.
    pub fn update(&mut self, now_ms: u64) -> u32 {
        let gap = match self.last_ms {
            Some(prev) => now_ms.saturating_sub(prev).min(MAX_FRAME_MS),
            None => 0,
        };
        self.last_ms = Some(now_ms);

        self.carry_ms += gap as f64;
        let steps = (self.carry_ms / self.step_ms).floor() as u32;
        self.carry_ms -= steps as f64 * self.step_ms;
        self.total_steps += steps as u64;
        steps
    }
}
