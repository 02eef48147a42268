//! Color themes — three fixed, weighted palettes.
//!
//! A theme is nothing more than an index into a static table.  Recoloring
//! draws a fresh weighted-random color per particle; positions are untouched.

use glam::Vec3;
use rand::Rng;

// ════════════════════════════════════════════════════════════════════════════
// Palettes
// ════════════════════════════════════════════════════════════════════════════

const CLASSIC: &[(Vec3, f32)] = &[
    (Vec3::new(0.05, 0.45, 0.15), 5.0), // deep pine
    (Vec3::new(0.20, 0.70, 0.25), 3.0), // needle green
    (Vec3::new(1.00, 0.80, 0.30), 1.0), // gold
    (Vec3::new(0.90, 0.15, 0.15), 1.0), // berry red
];

const FROST: &[(Vec3, f32)] = &[
    (Vec3::new(0.55, 0.80, 1.00), 4.0), // ice blue
    (Vec3::new(0.95, 0.97, 1.00), 3.0), // snow
    (Vec3::new(0.75, 0.78, 0.85), 2.0), // silver
    (Vec3::new(0.60, 0.50, 1.00), 1.0), // violet
];

const EMBER: &[(Vec3, f32)] = &[
    (Vec3::new(1.00, 0.75, 0.25), 4.0), // amber
    (Vec3::new(1.00, 0.45, 0.10), 3.0), // orange
    (Vec3::new(0.85, 0.10, 0.20), 2.0), // crimson
    (Vec3::new(1.00, 0.50, 0.65), 1.0), // rose
];

// ════════════════════════════════════════════════════════════════════════════
// ColorTheme
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorTheme {
    #[default]
    Classic,
    Frost,
    Ember,
}

impl ColorTheme {
    pub const COUNT: usize = 3;

    /// Theme for an index; wraps modulo [`ColorTheme::COUNT`].
    pub fn from_index(i: usize) -> Self {
        match i % Self::COUNT {
            0 => ColorTheme::Classic,
            1 => ColorTheme::Frost,
            _ => ColorTheme::Ember,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ColorTheme::Classic => 0,
            ColorTheme::Frost   => 1,
            ColorTheme::Ember   => 2,
        }
    }

    /// The next theme in the 0 → 1 → 2 → 0 cycle.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorTheme::Classic => "classic",
            ColorTheme::Frost   => "frost",
            ColorTheme::Ember   => "ember",
        }
    }

    pub fn palette(self) -> &'static [(Vec3, f32)] {
        match self {
            ColorTheme::Classic => CLASSIC,
            ColorTheme::Frost   => FROST,
            ColorTheme::Ember   => EMBER,
        }
    }

    /// Draw one color from the palette, weighted.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> Vec3 {
        let palette = self.palette();
        let total: f32 = palette.iter().map(|(_, w)| w).sum();
        let mut pick = rng.gen::<f32>() * total;
        for &(color, weight) in palette {
            if pick < weight {
                return color;
            }
            pick -= weight;
        }
        // Float round-off can walk off the end.
        palette[palette.len() - 1].0
    }

    /// Overwrite a flat `3N` color buffer with fresh samples.
    pub fn fill<R: Rng + ?Sized>(self, colors: &mut [f32], rng: &mut R) {
        for rgb in colors.chunks_exact_mut(3) {
            self.sample(rng).write_to_slice(rgb);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HSV
// ════════════════════════════════════════════════════════════════════════════

/// Convert HSV to linear RGB.  `h` is in turns (`0.0..1.0` wraps), `s`/`v`
/// in `0..=1`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h  = h.rem_euclid(1.0) * 6.0;
    let hi = h as u32;
    let f  = h - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Vec3::new(r, g, b)
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
    fn cycle_wraps() {
        let t = ColorTheme::Classic;
        assert_eq!(t.next(), ColorTheme::Frost);
        assert_eq!(t.next().next(), ColorTheme::Ember);
        assert_eq!(t.next().next().next(), ColorTheme::Classic);
        assert_eq!(ColorTheme::from_index(4), ColorTheme::Frost);
    }

    #[test]
    fn samples_come_from_palette() {
        let mut rng = StdRng::seed_from_u64(8);
        for theme in [ColorTheme::Classic, ColorTheme::Frost, ColorTheme::Ember] {
            for _ in 0..200 {
                let c = theme.sample(&mut rng);
                assert!(theme.palette().iter().any(|(p, _)| *p == c));
            }
        }
    }

    #[test]
    fn heavier_colors_dominate() {
        let mut rng = StdRng::seed_from_u64(11);
        let pine = CLASSIC[0].0;
        let berry = CLASSIC[3].0;
        let draws: Vec<Vec3> = (0..5000).map(|_| ColorTheme::Classic.sample(&mut rng)).collect();
        let n_pine  = draws.iter().filter(|c| **c == pine).count();
        let n_berry = draws.iter().filter(|c| **c == berry).count();
        assert!(n_pine > n_berry * 3);
    }

    #[test]
    fn fill_covers_every_particle() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut colors = vec![-1.0; 30];
        ColorTheme::Frost.fill(&mut colors, &mut rng);
        assert!(colors.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let green = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(green.y > 0.99 && green.x < 0.01 && green.z < 0.01);
        // Hue wraps past one full turn.
        assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), hsv_to_rgb(0.0, 1.0, 1.0));
    }
}
