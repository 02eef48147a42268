//! Deterministic pseudo-noise and golden-angle sampling.

use std::f32::consts::TAU;

/// The golden angle in radians, `π(3 − √5)` ≈ 2.399963.
///
/// Stepping azimuth by this angle per index spreads points around a circle
/// without ever lining them up into visible spokes.
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Sine-hash noise in `[0, 1)`.
///
/// `frac(sin(x·12.9898 + y·78.233 + z·37.719) · 43758.5453)`.  Pure: the
/// same input always gives the same output.  Evaluated in `f64` so large
/// particle indices keep their spread.
pub fn hash3(x: f32, y: f32, z: f32) -> f32 {
    let dot = x as f64 * 12.9898 + y as f64 * 78.233 + z as f64 * 37.719;
    let s = dot.sin() * 43758.5453;
    // Rounding to f32 can land exactly on 1.0; keep the interval half-open.
    ((s - s.floor()) as f32).min(1.0 - f32::EPSILON)
}

/// Azimuth of the `i`-th point on a golden-angle spiral, wrapped to `[0, 2π)`.
pub fn spiral_angle(i: usize) -> f32 {
    (i as f32 * GOLDEN_ANGLE) % TAU
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_unit_interval() {
        for i in 0..2000 {
            let h = hash3(i as f32, 0.0, 0.0);
            assert!((0.0..1.0).contains(&h), "hash({}) = {}", i, h);
        }
    }

    #[test]
    fn hash_is_pure() {
        assert_eq!(hash3(17.0, 3.0, 9.0), hash3(17.0, 3.0, 9.0));
        assert_ne!(hash3(1.0, 0.0, 0.0), hash3(0.0, 1.0, 0.0));
    }

    #[test]
    fn golden_angle_matches_closed_form() {
        let exact = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        assert!((GOLDEN_ANGLE - exact).abs() < 1e-5);
    }

    #[test]
    fn spiral_never_repeats_early() {
        // Consecutive points should never collapse onto the same spoke.
        for i in 0..100 {
            let d = (spiral_angle(i + 1) - spiral_angle(i)).abs();
            assert!(d > 0.1);
        }
    }
}
