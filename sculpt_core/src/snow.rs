//! Snowfall overlay, toggled by the two-finger gesture.
//!
//! Flakes fall from a box above the tree with their own speed and a gentle
//! sideways sway, wrapping back to the top when they pass the floor.  Each
//! start bumps a generation counter so a stale scheduled stop can be told
//! apart from the current one.

use rand::Rng;

const HALF_WIDTH: f32 = 40.0;
const TOP:        f32 = 40.0;
const FLOOR:      f32 = -26.0;
const FALL_MIN:   f32 = 0.05;
const FALL_MAX:   f32 = 0.15;
const SWAY:       f32 = 0.02;
const SWAY_FREQ:  f32 = 1.5;

#[derive(Debug, Default)]
pub struct Snowfall {
    positions:  Vec<f32>,
    speeds:     Vec<f32>,
    phases:     Vec<f32>,
    generation: u64,
}

impl Snowfall {
    pub fn new() -> Self { Self::default() }

    pub fn is_active(&self) -> bool { !self.positions.is_empty() }

    /// Generation of the current (or last) fall.
    pub fn generation(&self) -> u64 { self.generation }

    pub fn positions(&self) -> &[f32] { &self.positions }

    pub fn len(&self) -> usize { self.positions.len() / 3 }
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    /// Begin (or extend) a fall of `count` flakes.  Returns the new
    /// generation.  An already-running fall keeps its flakes.
    pub fn start<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> u64 {
        self.generation += 1;
        if self.is_active() {
            return self.generation;
        }
        self.positions  = Vec::with_capacity(3 * count);
        self.speeds     = Vec::with_capacity(count);
        self.phases     = Vec::with_capacity(count);
        for _ in 0..count {
            self.positions.push(rng.gen_range(-HALF_WIDTH..HALF_WIDTH));
            self.positions.push(rng.gen_range(FLOOR..TOP));
            self.positions.push(rng.gen_range(-HALF_WIDTH..HALF_WIDTH));
            self.speeds.push(rng.gen_range(FALL_MIN..FALL_MAX));
            self.phases.push(rng.gen_range(0.0..std::f32::consts::TAU));
        }
        self.generation
    }

    /// Stop the fall if `generation` is still current.  Returns whether it
    /// stopped.
    pub fn stop_if_current(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.is_active() {
            return false;
        }
        self.release();
        true
    }

    /// Advance every flake by one tick at simulated time `time`.
    pub fn step(&mut self, time: f32) {
        for ((p, &speed), &phase) in self.positions.chunks_exact_mut(3)
            .zip(&self.speeds)
            .zip(&self.phases)
        {
            p[0] += (time * SWAY_FREQ + phase).sin() * SWAY;
            p[1] -= speed;
            if p[1] < FLOOR {
                p[1] = TOP;
            }
        }
    }

    pub fn release(&mut self) {
        self.positions = Vec::new();
        self.speeds    = Vec::new();
        self.phases    = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn start_spawns_count_flakes() {
        let mut s = Snowfall::new();
        assert!(!s.is_active());
        s.start(300, &mut StdRng::seed_from_u64(1));
        assert!(s.is_active());
        assert_eq!(s.len(), 300);
        assert_eq!(s.positions().len(), 900);
    }

    #[test]
    fn flakes_fall_and_wrap() {
        let mut s = Snowfall::new();
        s.start(50, &mut StdRng::seed_from_u64(2));
        for k in 0..2000 {
            s.step(k as f32 / 60.0);
            for p in s.positions().chunks_exact(3) {
                assert!(p[1] >= FLOOR - FALL_MAX && p[1] <= TOP);
            }
        }
        assert_eq!(s.len(), 50);
    }

    #[test]
    fn stale_stop_is_ignored() {
        let mut s = Snowfall::new();
        let mut rng = StdRng::seed_from_u64(3);
        let first  = s.start(10, &mut rng);
        let second = s.start(10, &mut rng);
        assert!(second > first);
        assert!(!s.stop_if_current(first));
        assert!(s.is_active());
        assert!(s.stop_if_current(second));
        assert!(!s.is_active());
        assert!(!s.stop_if_current(second));
    }
}
