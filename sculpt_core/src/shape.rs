//! Target shape generators — the assembled tree and the exploded cloud.
//!
//! Both produce flat `[x0, y0, z0, x1, y1, z1, …]` buffers of exactly `3N`
//! floats, the same layout the physics integrator and the renderer use.

use rand::Rng;

use crate::config::EngineConfig;
use crate::noise::{hash3, spiral_angle};

// ════════════════════════════════════════════════════════════════════════════
// Tree shape parameters
// ════════════════════════════════════════════════════════════════════════════

/// Number of discrete height layers the tree is built from.
pub const TREE_LAYERS: usize = 12;

/// Maximum horizontal depth jitter at the very top of the tree.
pub const DEPTH_JITTER: f32 = 0.6;

/// Maximum vertical jitter applied to every particle.
pub const HEIGHT_JITTER: f32 = 0.3;

/// Fraction of a particle's radius by which it sags downward.
pub const DROOP: f32 = 0.4;

const MIN_LAYER_RADIUS: f32 = 0.6;
const LINEAR_TAPER_MIX: f32 = 0.8;
const CURVED_TAPER_MIX: f32 = 0.2;
const CURVED_TAPER_EXP: f32 = 1.3;

// Density redistribution: late particles are pulled into the lower half.
const LOWER_BIAS_WEIGHT: f32 = 0.7;
const LOWER_BIAS_SHARE:  f32 = 0.5;

// ════════════════════════════════════════════════════════════════════════════
// Generators
// ════════════════════════════════════════════════════════════════════════════

/// Build the assembled tree: a layered, drooping cone of `n` particles.
///
/// Azimuth follows the golden-angle spiral; radius within a layer is
/// area-uniform.  The cone is centred on the origin vertically, spanning
/// roughly `[-height/2, height/2]`.
pub fn generate_tree<R: Rng + ?Sized>(n: usize, height: f32, radius: f32, rng: &mut R) -> Vec<f32> {
    let mut out = Vec::with_capacity(n * 3);
    let top_layer = (TREE_LAYERS - 1) as f32;

    for i in 0..n {
        let progress = i as f32 / n as f32;
        let layer = if rng.gen::<f32>() < progress * LOWER_BIAS_WEIGHT {
            (rng.gen::<f32>() * LOWER_BIAS_SHARE * TREE_LAYERS as f32) as usize
        } else {
            (progress * TREE_LAYERS as f32) as usize
        }
        .min(TREE_LAYERS - 1);

        // t = 0 at the base, 1 at the tip.
        let t = layer as f32 / top_layer;
        let max_r = layer_radius(t, radius);
        let r = max_r * rng.gen::<f32>().sqrt();
        let angle = spiral_angle(i);

        let y = -height * 0.5 + t * height
            - DROOP * r
            + rng.gen_range(-HEIGHT_JITTER..=HEIGHT_JITTER);
        let depth = (rng.gen::<f32>() - 0.5) * 2.0 * DEPTH_JITTER * t;

        out.push(r * angle.cos());
        out.push(y);
        out.push(r * angle.sin() + depth);
    }
    out
}

/// Outer radius of the layer at normalised height `t`.
///
/// Blends a linear taper with a slightly curved one, floored so the tip
/// never collapses to a single point.
pub fn layer_radius(t: f32, radius: f32) -> f32 {
    let taper = (1.0 - t).max(0.0);
    let blended = radius * (LINEAR_TAPER_MIX * taper + CURVED_TAPER_MIX * taper.powf(CURVED_TAPER_EXP));
    blended.max(MIN_LAYER_RADIUS.min(radius))
}

/// Build the exploded cloud: `n` particles scattered by index-seeded noise.
///
/// Each axis is an independent hash of the particle index, mapped into
/// `(-spread/2, spread/2)`.  No randomness is involved, so two calls with the
/// same arguments produce bit-identical buffers.
pub fn generate_exploded(n: usize, spread: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(n * 3);
    for i in 0..n {
        let f = i as f32;
        out.push((hash3(f, 0.0, 0.0) - 0.5) * spread);
        out.push((hash3(0.0, f, 0.0) - 0.5) * spread);
        out.push((hash3(0.0, 0.0, f) - 0.5) * spread);
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Targets
// ════════════════════════════════════════════════════════════════════════════

/// Which of the two target configurations particles are steering toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Tree,
    Exploded,
}

/// The two immutable target snapshots, generated together.
#[derive(Clone, Debug)]
pub struct Targets {
    tree:     Vec<f32>,
    exploded: Vec<f32>,
}

impl Targets {
    pub fn generate<R: Rng + ?Sized>(cfg: &EngineConfig, rng: &mut R) -> Self {
        Targets {
            tree:     generate_tree(cfg.particle_count, cfg.tree_height, cfg.tree_radius, rng),
            exploded: generate_exploded(cfg.particle_count, cfg.exploded_spread),
        }
    }

    pub fn get(&self, kind: TargetKind) -> &[f32] {
        match kind {
            TargetKind::Tree     => &self.tree,
            TargetKind::Exploded => &self.exploded,
        }
    }

    pub fn tree(&self)     -> &[f32] { &self.tree }
    pub fn exploded(&self) -> &[f32] { &self.exploded }

    /// Particle count the targets were built for.
    pub fn len(&self) -> usize { self.tree.len() / 3 }

    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn buffers_are_three_n() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [0, 1, 7, 12, 500, 5000] {
            assert_eq!(generate_tree(n, 36.0, 14.0, &mut rng).len(), 3 * n);
            assert_eq!(generate_exploded(n, 60.0).len(), 3 * n);
        }
    }

    #[test]
    fn exploded_is_bit_identical() {
        let a = generate_exploded(5000, 60.0);
        let b = generate_exploded(5000, 60.0);
        assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    #[test]
    fn exploded_stays_inside_spread() {
        for v in generate_exploded(3000, 60.0) {
            assert!(v >= -30.0 && v < 30.0, "{}", v);
        }
    }

    #[test]
    fn tree_stays_inside_radius() {
        let mut rng = StdRng::seed_from_u64(42);
        let radius = 14.0;
        let tree = generate_tree(5000, 36.0, radius, &mut rng);
        for p in tree.chunks_exact(3) {
            let r = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!(r <= radius + 1e-4, "radial distance {} exceeds {}", r, radius);
        }
    }

    #[test]
    fn narrow_tree_respects_jitter_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let radius = 1.0;
        for p in generate_tree(2000, 10.0, radius, &mut rng).chunks_exact(3) {
            let r = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!(r <= radius.max(MIN_LAYER_RADIUS) + DEPTH_JITTER + 1e-4);
        }
    }

    #[test]
    fn tree_is_vertically_centred() {
        let mut rng = StdRng::seed_from_u64(9);
        let (h, radius) = (36.0, 14.0);
        let tree = generate_tree(5000, h, radius, &mut rng);
        let lo = -h / 2.0 - DROOP * radius - HEIGHT_JITTER;
        let hi = h / 2.0 + HEIGHT_JITTER;
        for p in tree.chunks_exact(3) {
            assert!(p[1] >= lo - 1e-4 && p[1] <= hi + 1e-4, "y = {}", p[1]);
        }
    }

    #[test]
    fn tree_is_denser_toward_base() {
        let mut rng = StdRng::seed_from_u64(5);
        let tree = generate_tree(5000, 36.0, 14.0, &mut rng);
        let below = tree.chunks_exact(3).filter(|p| p[1] < 0.0).count();
        assert!(below > 2500, "only {} of 5000 below mid-height", below);
    }

    #[test]
    fn seeded_tree_is_reproducible() {
        let a = generate_tree(300, 36.0, 14.0, &mut StdRng::seed_from_u64(77));
        let b = generate_tree(300, 36.0, 14.0, &mut StdRng::seed_from_u64(77));
        assert_eq!(a, b);
    }

    #[test]
    fn layer_radius_tapers_to_floor() {
        assert!((layer_radius(0.0, 14.0) - 14.0).abs() < 1e-5);
        assert!(layer_radius(0.5, 14.0) < 14.0);
        assert_eq!(layer_radius(1.0, 14.0), MIN_LAYER_RADIUS);
    }
}
