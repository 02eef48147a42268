//! Simulated time.
//!
//! The animation clock never looks at the wall clock: each tick advances by
//! the same fixed step, so everything timed against it is reproducible.

use crate::config::FIXED_DT;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimClock {
    elapsed: f64,
    frame:   u64,
    dt:      f32,
}

impl Default for SimClock {
    fn default() -> Self { Self::new(FIXED_DT) }
}

impl SimClock {
    pub fn new(dt: f32) -> Self {
        SimClock { elapsed: 0.0, frame: 0, dt }
    }

    /// Step forward by one tick.
    pub fn advance(&mut self) {
        self.frame += 1;
        self.elapsed = self.frame as f64 * self.dt as f64;
    }

    /// Seconds of simulated time since start.
    pub fn elapsed(&self) -> f64 { self.elapsed }
    pub fn frame(&self)   -> u64 { self.frame }
    pub fn dt(&self)      -> f32 { self.dt }
}
