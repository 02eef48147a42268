//! # sculpt_core
//!
//! Gesture-driven particle sculpture engine.  Particles drift as an exploded
//! cloud and assemble into a drooping, golden-angle tree while a fist is
//! held.  Finger-count gestures recolor the tree, start a snowfall or launch
//! layered fireworks.
//!
//! ## Per-frame data flow
//!
//! ```text
//! landmarks ─► classify ─► GestureDispatcher ─► Engine::post ─► mailbox
//!                                                                 │
//!                        render buffers ◄─ Engine::tick ◄─────────┘
//! ```
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Kind | Action |
//! |---|---|---|
//! | Fist (≥3 fingers + thumb curled) | continuous | Assemble the tree; strength = curled / 4 |
//! | Nothing recognised | continuous | Relax the pinch, drift back to the cloud |
//! | One finger | edge | Cycle color theme |
//! | Two fingers | edge | Snowfall for a few seconds |
//! | Three fingers | edge | Three staggered firework layers |
//!
//! The engine is single-threaded and never reads the wall clock: every
//! [`Engine::tick`] advances simulated time by [`config::FIXED_DT`].

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod firework;
pub mod gesture;
pub mod mailbox;
pub mod noise;
pub mod physics;
pub mod schedule;
pub mod shape;
pub mod snow;
pub mod theme;

pub use config::{EngineConfig, FingerThresholds, Threshold};
pub use dispatch::{Gesture, GestureDispatcher, Latch};
pub use engine::{Engine, GestureState};
pub use error::ConfigError;
pub use firework::{burst_opacity, BurstArena, BurstHandle, FireworkBurst};
pub use gesture::{classify, FingerState, HandPose, Landmark, LANDMARK_COUNT};
pub use mailbox::GestureMailbox;
pub use shape::{generate_exploded, generate_tree, TargetKind, Targets};
pub use theme::ColorTheme;
