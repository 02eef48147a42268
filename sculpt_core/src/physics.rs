//! Particle physics integrator.
//!
//! Owns the live position/velocity buffers and steers every particle toward
//! the active target each tick.  The attraction has constant magnitude and
//! only its direction depends on the displacement, so particles cruise
//! toward their targets at a steady speed rather than easing in like a spring.

use glam::Vec3;
use rand::Rng;

use crate::shape::{TargetKind, Targets};

/// Displacements shorter than this receive no force.
pub const MIN_FORCE_DISTANCE: f32 = 0.01;

/// Pinch strengths above this select the tree target.
pub const PINCH_THRESHOLD: f32 = 0.01;

// ════════════════════════════════════════════════════════════════════════════
// Forces
// ════════════════════════════════════════════════════════════════════════════

/// Per-tick force parameters, resolved from the config and gesture state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Forces {
    pub gravity_strength:   f32,
    pub explosion_strength: f32,
    pub damping:            f32,
    pub brown_motion:       f32,
}

impl Forces {
    /// Target and attraction magnitude for a given pinch strength.
    pub fn resolve(&self, pinch_strength: f32) -> (TargetKind, f32) {
        if pinch_strength > PINCH_THRESHOLD {
            (TargetKind::Tree, self.gravity_strength * pinch_strength)
        } else {
            (TargetKind::Exploded, self.explosion_strength)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

/// Live particle state: `3N` positions and `3N` velocities.
///
/// Buffers are allocated once and updated in place.
#[derive(Clone, Debug)]
pub struct ParticleField {
    positions:  Vec<f32>,
    velocities: Vec<f32>,
    dirty:      bool,
}

impl ParticleField {
    /// Start every particle at rest on `initial` (a `3N` buffer).
    pub fn new(initial: &[f32]) -> Self {
        ParticleField {
            positions:  initial.to_vec(),
            velocities: vec![0.0; initial.len()],
            dirty:      true,
        }
    }

    pub fn len(&self)        -> usize  { self.positions.len() / 3 }
    pub fn is_empty(&self)   -> bool   { self.positions.is_empty() }
    pub fn positions(&self)  -> &[f32] { &self.positions }
    pub fn velocities(&self) -> &[f32] { &self.velocities }

    pub fn position(&self, i: usize) -> Vec3 { Vec3::from_slice(&self.positions[3 * i..]) }
    pub fn velocity(&self, i: usize) -> Vec3 { Vec3::from_slice(&self.velocities[3 * i..]) }

    pub fn set_velocity(&mut self, i: usize, v: Vec3) {
        v.write_to_slice(&mut self.velocities[3 * i..3 * i + 3]);
    }

    /// Whether positions changed since the renderer last looked.
    pub fn is_dirty(&self) -> bool { self.dirty }

    /// Return and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Advance every particle by one tick.
    ///
    /// 1. pick the target (tree while pinching, exploded otherwise),
    /// 2. push toward it with constant magnitude unless already on it,
    /// 3. add Brownian jitter while not pinching,
    /// 4. damp, then integrate with explicit Euler.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        targets: &Targets,
        forces: &Forces,
        pinch_strength: f32,
        rng: &mut R,
    ) {
        let (kind, magnitude) = forces.resolve(pinch_strength);
        let target = targets.get(kind);
        let jitter = kind == TargetKind::Exploded && forces.brown_motion > 0.0;

        for ((pos, vel), tgt) in self.positions.chunks_exact_mut(3)
            .zip(self.velocities.chunks_exact_mut(3))
            .zip(target.chunks_exact(3))
        {
            let p = Vec3::from_slice(pos);
            let mut v = Vec3::from_slice(vel);

            let d = Vec3::from_slice(tgt) - p;
            let dist = d.length();
            if dist > MIN_FORCE_DISTANCE {
                v += d * (magnitude / dist);
            }

            if jitter {
                v += Vec3::new(
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                ) * forces.brown_motion;
            }

            v *= forces.damping;
            (p + v).write_to_slice(pos);
            v.write_to_slice(vel);
        }
        self.dirty = true;
    }

    /// Drop both buffers.
    pub fn release(&mut self) {
        self.positions  = Vec::new();
        self.velocities = Vec::new();
        self.dirty = false;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn forces(brown_motion: f32) -> Forces {
        Forces {
            gravity_strength:   0.05,
            explosion_strength: 0.03,
            damping:            0.92,
            brown_motion,
        }
    }

    fn small_targets(n: usize) -> Targets {
        let cfg = EngineConfig { particle_count: n, ..EngineConfig::default() };
        Targets::generate(&cfg, &mut StdRng::seed_from_u64(4))
    }

    fn dist_to(field: &ParticleField, target: &[f32], i: usize) -> f32 {
        (field.position(i) - Vec3::from_slice(&target[3 * i..])).length()
    }

    #[test]
    fn resolve_picks_target_by_pinch() {
        let f = forces(0.0);
        assert_eq!(f.resolve(0.0).0, TargetKind::Exploded);
        assert_eq!(f.resolve(0.01).0, TargetKind::Exploded);
        let (kind, mag) = f.resolve(0.5);
        assert_eq!(kind, TargetKind::Tree);
        assert!((mag - 0.025).abs() < 1e-6);
    }

    #[test]
    fn buffers_keep_their_length() {
        let targets = small_targets(64);
        let mut field = ParticleField::new(targets.exploded());
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            field.step(&targets, &forces(0.04), 0.0, &mut rng);
        }
        assert_eq!(field.positions().len(), 64 * 3);
        assert_eq!(field.velocities().len(), 64 * 3);
    }

    #[test]
    fn pinch_converges_onto_tree() {
        let targets = small_targets(32);
        let mut field = ParticleField::new(targets.exploded());
        let mut rng = StdRng::seed_from_u64(0);
        let f = forces(0.0);

        // Worst-case exploded→tree distance is well under 80 units; at a
        // terminal speed of ~0.57 units/tick that is comfortably < 300 ticks.
        let mut reached = vec![false; field.len()];
        for _ in 0..300 {
            field.step(&targets, &f, 1.0, &mut rng);
            for (i, r) in reached.iter_mut().enumerate() {
                if dist_to(&field, targets.tree(), i) < 0.5 { *r = true; }
            }
        }
        assert!(reached.iter().all(|r| *r));

        // Once there, particles stay in a tight orbit around their target.
        for _ in 0..500 {
            field.step(&targets, &f, 1.0, &mut rng);
        }
        for i in 0..field.len() {
            assert!(dist_to(&field, targets.tree(), i) < 1.0);
        }
    }

    #[test]
    fn release_returns_to_exploded() {
        let targets = small_targets(16);
        let mut field = ParticleField::new(targets.tree());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..600 {
            field.step(&targets, &forces(0.0), 0.0, &mut rng);
        }
        for i in 0..field.len() {
            assert!(dist_to(&field, targets.exploded(), i) < 1.0);
        }
    }

    #[test]
    fn damping_shrinks_velocity_without_force() {
        // A particle sitting on its target gets no force, so only damping acts.
        let targets = small_targets(4);
        let mut field = ParticleField::new(targets.tree());
        field.set_velocity(0, Vec3::new(0.004, -0.003, 0.002));
        let before = field.velocity(0).length();
        field.step(&targets, &forces(0.0), 1.0, &mut StdRng::seed_from_u64(0));
        let after = field.velocity(0).length();
        assert!(after <= before);
        assert!((after - before * 0.92).abs() < 1e-6);
    }

    #[test]
    fn velocity_stays_bounded() {
        // Terminal speed under constant force F and damping d is F·d/(1−d).
        let targets = small_targets(8);
        let mut field = ParticleField::new(targets.exploded());
        for i in 0..field.len() {
            field.set_velocity(i, Vec3::new(50.0, -20.0, 10.0));
        }
        let mut rng = StdRng::seed_from_u64(6);
        let f = forces(0.04);
        let start = field.velocity(0).length();
        let mut prev = start;
        for _ in 0..40 {
            field.step(&targets, &f, 1.0, &mut rng);
            let now = field.velocity(0).length();
            // Far above terminal speed, damping dominates every tick.
            if prev > 5.0 { assert!(now < prev); }
            prev = now;
        }
        for _ in 0..2000 {
            field.step(&targets, &f, 0.0, &mut rng);
        }
        let terminal = (0.05 + 0.04) * 0.92 / (1.0 - 0.92);
        for i in 0..field.len() {
            let v = field.velocity(i).length();
            assert!(v.is_finite() && v < terminal + 0.1, "speed {}", v);
        }
    }

    #[test]
    fn jitter_only_while_released() {
        let targets = small_targets(4);
        let f = forces(0.04);
        let mut rng = StdRng::seed_from_u64(9);

        // Resting exactly on the exploded target: no attraction, so any
        // motion after one tick comes from the jitter.
        let mut field = ParticleField::new(targets.exploded());
        field.step(&targets, &f, 0.0, &mut rng);
        for i in 0..field.len() {
            assert_ne!(field.velocity(i), Vec3::ZERO);
        }

        // Resting on the tree while pinching: nothing moves at all.
        let mut field = ParticleField::new(targets.tree());
        field.step(&targets, &f, 1.0, &mut rng);
        for i in 0..field.len() {
            assert_eq!(field.velocity(i), Vec3::ZERO);
        }
    }

    #[test]
    fn pull_does_not_depend_on_distance() {
        let targets = small_targets(2);
        let mut start = targets.tree().to_vec();
        start[0] += 1.0;   // particle 0: 1 unit away along x
        start[4] -= 50.0;  // particle 1: 50 units away along y
        let mut field = ParticleField::new(&start);
        let f = forces(0.0);
        field.step(&targets, &f, 1.0, &mut StdRng::seed_from_u64(0));

        let expected = f.gravity_strength * f.damping;
        for i in 0..2 {
            let speed = field.velocity(i).length();
            assert!((speed - expected).abs() < 1e-5, "particle {} speed {}", i, speed);
        }
    }

    #[test]
    fn step_marks_dirty() {
        let targets = small_targets(4);
        let mut field = ParticleField::new(targets.exploded());
        assert!(field.take_dirty());
        assert!(!field.is_dirty());
        field.step(&targets, &forces(0.0), 0.0, &mut StdRng::seed_from_u64(0));
        assert!(field.is_dirty());
    }
}
