// pacer.rs - Fixed-rate step gate for a display-driven tick source
//
// Ticks arrive at whatever rate the display runs. A step is allowed once a
// full interval has passed; the remainder is carried into the next threshold
// so the average step rate converges on the target fps.

#[derive(Clone, Debug)]
pub struct FramePacer {
    interval_ms: f64,
    last_step_ms: f64,
}

impl FramePacer {
    pub fn new(interval_ms: f64) -> Self {
        Self { interval_ms, last_step_ms: 0.0 }
    }

    /// Returns true if a step should run at `now_ms`
    pub fn ready(&mut self, now_ms: f64) -> bool {
        let elapsed = now_ms - self.last_step_ms;
        if elapsed < self.interval_ms {
            return false;
        }
        self.last_step_ms = now_ms - elapsed % self.interval_ms;
        true
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn last_step_ms(&self) -> f64 {
        self.last_step_ms
    }
}
