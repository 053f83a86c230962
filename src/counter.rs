//! Step counter: converts a running tick value into discrete step events.

/// Fires a step whenever more than `ticks_per_step` ticks have passed since
/// the last step. The interval can shrink at runtime (speed-up) but never
/// grows back.
///
/// Ticks must be non-decreasing within a session; behaviour on regressing
/// ticks is undefined and left to the caller.
#[derive(Debug, Clone)]
pub struct StepCounter {
    ticks_per_step: f64,
    last_step: f64,
}

impl StepCounter {
    pub fn new(ticks_per_step: f64) -> Self {
        Self {
            ticks_per_step,
            last_step: 0.0,
        }
    }

    /// Returns true iff a step interval has elapsed since the last step,
    /// resetting the reference point when it has.
    pub fn update(&mut self, ticks: f64) -> bool {
        if ticks - self.last_step > self.ticks_per_step {
            self.last_step = ticks;
            return true;
        }
        false
    }

    /// Shrinks the step interval by `factor` (expected < 1). No lower bound
    /// is enforced here; callers must avoid degenerate intervals.
    pub fn speed_up(&mut self, factor: f64) {
        self.ticks_per_step *= factor;
    }

    pub fn ticks_per_step(&self) -> f64 {
        self.ticks_per_step
    }
}
