//! Top-level application state.
//!
//! `AppState` owns the `Engine` and the `GestureDispatcher`.  It turns
//! perception messages into gestures, posts them to the engine, and advances
//! the engine once per rendered frame.

use std::sync::mpsc::{self, TryRecvError};

use sculpt_core::{Engine, EngineConfig, Gesture, GestureDispatcher};
use tracing::{error, info};

use crate::error::AppError;
use crate::perception::{spawn_landmark_source, PerceptionMessage, PerceptionStatus, SimInput};
#[cfg(not(feature = "leap"))]
use crate::perception::SimLandmarkSource;
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    /// Fixed seed for a reproducible run; entropy when absent.
    pub seed:   Option<u64>,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    engine:     Engine,
    dispatcher: GestureDispatcher,
    perception: PerceptionStatus,
    pub status: String,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Result<Self, AppError> {
        let dispatcher = GestureDispatcher::new(cfg.engine.fingers);
        let engine = match cfg.seed {
            Some(seed) => Engine::with_seed(cfg.engine, seed)?,
            None       => Engine::new(cfg.engine)?,
        };
        Ok(AppState {
            engine,
            dispatcher,
            perception: PerceptionStatus::Connecting,
            status:     "Waiting for a hand…".to_string(),
        })
    }

    // ── process one PerceptionMessage ─────────────────────────────────────

    pub fn handle_message(&mut self, msg: PerceptionMessage) {
        match msg {
            PerceptionMessage::Status(status) => {
                if status.is_terminal() {
                    error!(%status, "perception failed");
                } else {
                    info!(%status, "perception status");
                }
                self.status = status.to_string();
                self.perception = status;
            }
            PerceptionMessage::Frame(landmarks) => {
                let gestures = self.dispatcher.observe(&landmarks);
                if let Some(text) = self.describe(&gestures) {
                    self.status = text;
                }
                self.engine.post_all(gestures);
            }
        }
    }

    /// Status line for this frame's gestures, edges taking precedence.
    fn describe(&self, gestures: &[Gesture]) -> Option<String> {
        let edge = gestures.iter().find(|g| g.is_discrete());
        let shown = edge.or_else(|| gestures.last())?;
        Some(match shown {
            Gesture::OneFinger    => format!("ONE FINGER — theme: {}", self.engine.theme().next().name()),
            Gesture::TwoFingers   => "TWO FINGERS — let it snow".to_string(),
            Gesture::ThreeFingers => "THREE FINGERS — fireworks!".to_string(),
            Gesture::Pinch { strength, .. } => format!("FIST — assembling  strength={:.2}", strength),
            Gesture::None         => "Open hand — drifting".to_string(),
        })
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self) -> bool {
        self.engine.tick()
    }

    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn engine(&self)     -> &Engine            { &self.engine }
    pub fn engine_mut(&mut self) -> &mut Engine    { &mut self.engine }
    pub fn perception(&self) -> &PerceptionStatus  { &self.perception }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer, the landmark source (simulation by default,
/// hardware with `--features leap`) and drives the event/render loop at
/// ~60 fps until the window closes.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    // ── Sim input channel ─────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    #[cfg(feature = "leap")]
    let perception_rx = {
        drop(sim_rx);
        spawn_landmark_source(crate::perception::LeapLandmarkSource)
    };
    #[cfg(not(feature = "leap"))]
    let perception_rx = spawn_landmark_source(SimLandmarkSource::new(sim_rx));

    // ── Visualizer (owns the window and the sim input sender) ─────────────
    let mut vis = Visualizer::new(sim_tx)?;

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(cfg)?;

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Poll window input → SimInput
        if !vis.poll_input() { break; }

        // 2. Drain perception messages
        loop {
            match perception_rx.try_recv() {
                Ok(msg) => app.handle_message(msg),
                Err(TryRecvError::Empty) => break,
                // Source gone: keep rendering, the scene just drifts.
                Err(TryRecvError::Disconnected) => break,
            }
        }

        // 3. Simulate
        app.tick();

        // 4. Render
        vis.render(&mut app.engine, &app.status);
    }

    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
