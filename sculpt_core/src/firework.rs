//! Firework bursts.
//!
//! A three-finger gesture launches three layered bursts from one origin: a
//! big fast outer shell, then two smaller, slower ones 100 ms apart.  Each
//! burst is a self-contained particle record that ages on the simulation
//! clock, whitens past half-life, fades out over its last 30 % and is
//! released from the arena on the tick it expires.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use tracing::debug;

use crate::config::FIREWORK_LIFETIME;
use crate::theme::hsv_to_rgb;

// ════════════════════════════════════════════════════════════════════════════
// Layers
// ════════════════════════════════════════════════════════════════════════════

/// Shape of one burst layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstLayer {
    pub count:     usize,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Render size of each spark.
    pub size:      f32,
    /// Launch delay after the gesture, in seconds.
    pub delay:     f32,
}

pub const LAYERS: [BurstLayer; 3] = [
    BurstLayer { count: 200, speed_min: 0.55, speed_max: 0.85, size: 1.4, delay: 0.0 },
    BurstLayer { count: 150, speed_min: 0.40, speed_max: 0.62, size: 1.0, delay: 0.1 },
    BurstLayer { count: 100, speed_min: 0.28, speed_max: 0.42, size: 0.7, delay: 0.2 },
];

/// Hue offset (in turns) of the gradient's far end from the base hue.
pub const COMPLEMENT_OFFSET: f32 = 0.3;

const SATURATION:   f32 = 0.85;
const WHITEN_START: f32 = 0.5;
const WHITEN_RATE:  f32 = 0.04;
const FADE_START:   f32 = 0.7;

/// Opacity schedule: opaque until 70 % of the lifetime, then a linear fade
/// reaching zero at 100 %.
pub fn burst_opacity(age: f32, lifetime: f32) -> f32 {
    let t = age / lifetime;
    if t <= FADE_START {
        1.0
    } else {
        ((1.0 - t) / (1.0 - FADE_START)).clamp(0.0, 1.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FireworkBurst
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct FireworkBurst {
    pub positions:   Vec<f32>,
    pub velocities:  Vec<f32>,
    pub colors:      Vec<f32>,
    pub age:         f32,
    pub lifetime:    f32,
    pub active:      bool,
    pub layer_index: usize,
}

impl FireworkBurst {
    /// Spawn one layer at `origin`.  Velocities are uniform over the sphere;
    /// colors run along a gradient from `base_hue` to its complement.
    pub fn spawn<R: Rng + ?Sized>(origin: Vec3, layer_index: usize, base_hue: f32, rng: &mut R) -> Self {
        let layer_index = layer_index.min(LAYERS.len() - 1);
        let layer = LAYERS[layer_index];
        let m = layer.count;

        let from = hsv_to_rgb(base_hue, SATURATION, 1.0);
        let to   = hsv_to_rgb(base_hue + COMPLEMENT_OFFSET, SATURATION, 1.0);

        let mut positions  = Vec::with_capacity(3 * m);
        let mut velocities = Vec::with_capacity(3 * m);
        let mut colors     = Vec::with_capacity(3 * m);

        for j in 0..m {
            let theta = rng.gen::<f32>() * TAU;
            let phi   = (2.0 * rng.gen::<f32>() - 1.0).acos();
            let speed = rng.gen_range(layer.speed_min..=layer.speed_max);
            let dir = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());

            positions.extend_from_slice(&origin.to_array());
            velocities.extend_from_slice(&(dir * speed).to_array());

            let t = if m > 1 { j as f32 / (m - 1) as f32 } else { 0.0 };
            colors.extend_from_slice(&from.lerp(to, t).to_array());
        }

        FireworkBurst {
            positions,
            velocities,
            colors,
            age: 0.0,
            lifetime: FIREWORK_LIFETIME,
            active: true,
            layer_index,
        }
    }

    pub fn len(&self) -> usize { self.positions.len() / 3 }
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    pub fn size(&self) -> f32 { LAYERS[self.layer_index].size }

    /// `age / lifetime`.
    pub fn progress(&self) -> f32 { self.age / self.lifetime }

    pub fn opacity(&self) -> f32 { burst_opacity(self.age, self.lifetime) }

    /// Age by `dt` and, if still alive, integrate one tick.
    pub fn step(&mut self, gravity: f32, air_resistance: f32, dt: f32) {
        if !self.active { return; }

        self.age += dt;
        if self.age > self.lifetime {
            self.active = false;
            return;
        }

        for (pos, vel) in self.positions.chunks_exact_mut(3).zip(self.velocities.chunks_exact_mut(3)) {
            pos[0] += vel[0];
            pos[1] += vel[1];
            pos[2] += vel[2];
            vel[1] -= gravity;
            for v in vel.iter_mut() { *v *= air_resistance; }
        }

        if self.progress() > WHITEN_START {
            for c in &mut self.colors {
                *c += (1.0 - *c) * WHITEN_RATE;
            }
        }
    }

    /// Drop the particle buffers.
    pub fn release(&mut self) {
        self.positions  = Vec::new();
        self.velocities = Vec::new();
        self.colors     = Vec::new();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// BurstArena
// ════════════════════════════════════════════════════════════════════════════

/// Index of a burst in the arena.  Valid until the next [`BurstArena::step`],
/// which compacts the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurstHandle(usize);

/// Dense storage for the live bursts.
#[derive(Debug, Default)]
pub struct BurstArena {
    bursts: Vec<FireworkBurst>,
}

impl BurstArena {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, burst: FireworkBurst) -> BurstHandle {
        self.bursts.push(burst);
        BurstHandle(self.bursts.len() - 1)
    }

    pub fn get(&self, h: BurstHandle) -> Option<&FireworkBurst> { self.bursts.get(h.0) }

    pub fn iter(&self) -> impl Iterator<Item = &FireworkBurst> { self.bursts.iter() }

    pub fn len(&self)      -> usize { self.bursts.len() }
    pub fn is_empty(&self) -> bool  { self.bursts.is_empty() }

    /// Total sparks across every live burst.
    pub fn particle_count(&self) -> usize { self.bursts.iter().map(|b| b.len()).sum() }

    /// Step every burst, then compact out the ones that expired this tick.
    /// Returns how many were retired.
    pub fn step(&mut self, gravity: f32, air_resistance: f32, dt: f32) -> usize {
        for b in &mut self.bursts {
            b.step(gravity, air_resistance, dt);
        }
        let before = self.bursts.len();
        self.bursts.retain_mut(|b| {
            if b.active { return true; }
            debug!(layer = b.layer_index, age = b.age, "burst retired");
            b.release();
            false
        });
        before - self.bursts.len()
    }

    pub fn clear(&mut self) {
        self.bursts.clear();
        self.bursts.shrink_to_fit();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
