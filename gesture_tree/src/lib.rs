//! # gesture_tree
//!
//! Hand-gesture controller for the `sculpt_core` particle engine, with a
//! software-rendered point-cloud visualizer.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Fires | Action |
//! |---|---|---|
//! | Fist | every frame while held | Pull particles into the tree; strength ∝ how tightly closed |
//! | One finger | once per raise | Cycle the color theme |
//! | Two fingers | once per raise | Start (or extend) an 8 s snowfall |
//! | Three fingers | once per raise | Launch a staggered three-layer firework |
//! | Open hand / no hand | — | Pinch relaxes; particles drift back out |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard and mouse drive a synthetic hand.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Hand |
//! |---|---|
//! | hold `F` | Fist |
//! | hold `G` | Half-closed grip (weak pinch) |
//! | hold `1` / `2` / `3` | One, two or three fingers raised |
//! | hold `O` | Open palm |
//! | mouse | Palm position (tilts the sculpture) |
//! | `Q` / `Escape` | Quit |

pub mod error;
pub mod perception;
pub mod visualizer;
pub mod app;

pub use app::{run, AppConfig, AppState};
pub use error::{AppError, PerceptionError};
