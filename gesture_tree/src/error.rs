//! Error types for the perception boundary and the application shell.
//!
//! Everything user-visible originates here: the engine itself cannot fail
//! once its configuration is accepted.

use sculpt_core::ConfigError;
use thiserror::Error;

/// Terminal failures of the hand-tracking collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PerceptionError {
    /// The tracking service never came up inside the retry window.
    #[error("hand tracking unavailable after {attempts} attempts; restart to try again")]
    Unavailable { attempts: u32 },

    /// Access to the tracking device was refused.
    #[error("access to the hand-tracking device was denied; grant permission and restart")]
    PermissionDenied,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to open window: {0}")]
    Window(#[from] minifb::Error),

    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
}
