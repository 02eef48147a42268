//! The engine's configuration table.
//!
//! Every value here is a build-time constant.  [`EngineConfig::default`]
//! assembles them into one table so the engine and its tests pass a single
//! value around instead of reaching for globals.

use crate::error::ConfigError;

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

pub const PARTICLE_COUNT:          usize = 5000;
pub const TREE_HEIGHT:             f32   = 36.0;
pub const TREE_RADIUS:             f32   = 14.0;
pub const EXPLODED_SPREAD:         f32   = 60.0;

pub const GRAVITY_STRENGTH:        f32   = 0.05;
pub const EXPLOSION_STRENGTH:      f32   = 0.03;
pub const DAMPING:                 f32   = 0.92;
pub const BROWN_MOTION:            f32   = 0.04;
/// Pinch strength lost per "no gesture" observation.
pub const PINCH_DECAY:             f32   = 0.05;

pub const ROTATION_SPEED_X:        f32   = 0.05;
pub const ROTATION_SPEED_Y:        f32   = 0.004;

pub const SNOW_COUNT:              usize = 1500;
/// Seconds of snowfall per two-finger gesture.
pub const SNOW_DURATION:           f32   = 8.0;

pub const FIREWORK_GRAVITY:        f32   = 0.006;
pub const FIREWORK_AIR_RESISTANCE: f32   = 0.97;
/// Seconds a firework burst stays alive.
pub const FIREWORK_LIFETIME:       f32   = 3.0;

/// Nominal simulation step in seconds.  Every tick advances time by exactly this.
pub const FIXED_DT:                f32   = 1.0 / 60.0;

// Finger thresholds, in normalised image units of |tip.y − palm_base.y|.
pub const THUMB_CURL:   f32 = 0.10;
pub const THUMB_EXTEND: f32 = 0.16;
pub const INDEX_CURL:   f32 = 0.07;
pub const INDEX_EXTEND: f32 = 0.15;
pub const MIDDLE_CURL:  f32 = 0.07;
pub const MIDDLE_EXTEND:f32 = 0.15;
pub const RING_CURL:    f32 = 0.07;
pub const RING_EXTEND:  f32 = 0.14;
pub const PINKY_CURL:   f32 = 0.06;
pub const PINKY_EXTEND: f32 = 0.12;

// ════════════════════════════════════════════════════════════════════════════
// FingerThresholds
// ════════════════════════════════════════════════════════════════════════════

/// Curl/extend cut-offs for one finger.
///
/// A finger is curled when its tip sits within `curl` of the palm base
/// vertically, and extended when it sits further than `extend`.  Between the
/// two it is neither.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threshold {
    pub curl:   f32,
    pub extend: f32,
}

/// One [`Threshold`] per finger.  The thumb is deliberately looser.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FingerThresholds {
    pub thumb:  Threshold,
    pub index:  Threshold,
    pub middle: Threshold,
    pub ring:   Threshold,
    pub pinky:  Threshold,
}

impl Default for FingerThresholds {
    fn default() -> Self {
        FingerThresholds {
            thumb:  Threshold { curl: THUMB_CURL,  extend: THUMB_EXTEND  },
            index:  Threshold { curl: INDEX_CURL,  extend: INDEX_EXTEND  },
            middle: Threshold { curl: MIDDLE_CURL, extend: MIDDLE_EXTEND },
            ring:   Threshold { curl: RING_CURL,   extend: RING_EXTEND   },
            pinky:  Threshold { curl: PINKY_CURL,  extend: PINKY_EXTEND  },
        }
    }
}

impl FingerThresholds {
    /// Thresholds in thumb → pinky order, paired with a display name.
    pub fn named(&self) -> [(&'static str, Threshold); 5] {
        [
            ("thumb",  self.thumb),
            ("index",  self.index),
            ("middle", self.middle),
            ("ring",   self.ring),
            ("pinky",  self.pinky),
        ]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EngineConfig
// ════════════════════════════════════════════════════════════════════════════

/// The full configuration table consumed by [`crate::Engine`].
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub particle_count:          usize,
    pub tree_height:             f32,
    pub tree_radius:             f32,
    pub exploded_spread:         f32,
    pub gravity_strength:        f32,
    pub explosion_strength:      f32,
    pub damping:                 f32,
    pub brown_motion:            f32,
    pub pinch_decay:             f32,
    pub rotation_speed_x:        f32,
    pub rotation_speed_y:        f32,
    pub snow_count:              usize,
    pub snow_duration:           f32,
    pub firework_gravity:        f32,
    pub firework_air_resistance: f32,
    pub fingers:                 FingerThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            particle_count:          PARTICLE_COUNT,
            tree_height:             TREE_HEIGHT,
            tree_radius:             TREE_RADIUS,
            exploded_spread:         EXPLODED_SPREAD,
            gravity_strength:        GRAVITY_STRENGTH,
            explosion_strength:      EXPLOSION_STRENGTH,
            damping:                 DAMPING,
            brown_motion:            BROWN_MOTION,
            pinch_decay:             PINCH_DECAY,
            rotation_speed_x:        ROTATION_SPEED_X,
            rotation_speed_y:        ROTATION_SPEED_Y,
            snow_count:              SNOW_COUNT,
            snow_duration:           SNOW_DURATION,
            firework_gravity:        FIREWORK_GRAVITY,
            firework_air_resistance: FIREWORK_AIR_RESISTANCE,
            fingers:                 FingerThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Check the table for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ConfigError::Damping(self.damping));
        }
        if !(self.firework_air_resistance > 0.0 && self.firework_air_resistance <= 1.0) {
            return Err(ConfigError::AirResistance(self.firework_air_resistance));
        }
        if !(self.tree_height > 0.0 && self.tree_radius > 0.0) {
            return Err(ConfigError::TreeShape {
                height: self.tree_height,
                radius: self.tree_radius,
            });
        }
        for (name, value) in [
            ("exploded_spread", self.exploded_spread),
            ("snow_duration",   self.snow_duration),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }
        for (finger, t) in self.fingers.named() {
            if !(t.curl < t.extend) {
                return Err(ConfigError::FingerThreshold {
                    finger,
                    curl:   t.curl,
                    extend: t.extend,
                });
            }
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
