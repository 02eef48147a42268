//! Error types for the engine.
//!
//! The simulation itself never fails at runtime; the only fallible step is
//! accepting a configuration table.

use thiserror::Error;

/// A configuration value the engine refuses to run with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("particle count must be at least 1")]
    NoParticles,

    #[error("damping must lie strictly between 0 and 1, got {0}")]
    Damping(f32),

    #[error("firework air resistance must lie in (0, 1], got {0}")]
    AirResistance(f32),

    #[error("tree height and radius must be positive, got height={height} radius={radius}")]
    TreeShape { height: f32, radius: f32 },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("{finger} curl threshold {curl} must be below its extend threshold {extend}")]
    FingerThreshold {
        finger: &'static str,
        curl:   f32,
        extend: f32,
    },
}
