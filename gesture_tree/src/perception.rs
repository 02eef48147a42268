//! Hand-landmark acquisition — from LeapMotion hardware or the keyboard
//! simulator.
//!
//! Every source runs on its own thread at its own cadence and delivers
//! [`PerceptionMessage`]s over an `mpsc` channel.  The render loop never
//! knows which kind of source it is talking to.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use sculpt_core::{HandPose, Landmark};
use tracing::{info, warn};

use crate::error::PerceptionError;

// ════════════════════════════════════════════════════════════════════════════
// Messages
// ════════════════════════════════════════════════════════════════════════════

/// Lifecycle of the perception collaborator as shown to the user.
#[derive(Clone, Debug, PartialEq)]
pub enum PerceptionStatus {
    Connecting,
    Ready,
    /// Terminal: no further frames will arrive.
    Error(PerceptionError),
}

impl PerceptionStatus {
    pub fn is_terminal(&self) -> bool { matches!(self, PerceptionStatus::Error(_)) }
}

impl fmt::Display for PerceptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerceptionStatus::Connecting => write!(f, "connecting to hand tracking"),
            PerceptionStatus::Ready      => write!(f, "hand tracking ready"),
            PerceptionStatus::Error(e)   => write!(f, "error: {}", e),
        }
    }
}

/// One delivery from a landmark source.
#[derive(Clone, Debug, PartialEq)]
pub enum PerceptionMessage {
    /// Landmarks for the first tracked hand; empty when no hand is visible.
    Frame(Vec<Landmark>),
    Status(PerceptionStatus),
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver landmark frames over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<PerceptionMessage>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<PerceptionMessage> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Bounded connection retry
// ════════════════════════════════════════════════════════════════════════════

/// Why one connection attempt failed.
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectFailure {
    /// Access refused — retrying will not help.
    Denied,
    /// Anything else; worth another attempt.
    Retryable(String),
}

/// Try `connect` up to `attempts` times, `delay` apart.
///
/// A denial aborts immediately.  Running out of attempts yields
/// [`PerceptionError::Unavailable`]; the caller should not retry further.
pub fn connect_with_retry<T, F>(attempts: u32, delay: Duration, mut connect: F) -> Result<T, PerceptionError>
where
    F: FnMut() -> Result<T, ConnectFailure>,
{
    for attempt in 1..=attempts {
        match connect() {
            Ok(c) => return Ok(c),
            Err(ConnectFailure::Denied) => return Err(PerceptionError::PermissionDenied),
            Err(ConnectFailure::Retryable(reason)) => {
                warn!(attempt, attempts, %reason, "hand tracking not ready");
                if attempt < attempts {
                    thread::sleep(delay);
                }
            }
        }
    }
    Err(PerceptionError::Unavailable { attempts })
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joints are mapped onto the 21-point layout: for each digit the proximal,
/// intermediate and distal bases plus the tip, so index 9 (middle finger
/// knuckle) stays the palm base.  Millimetres are folded into `[0, 1]`
/// image space with `y` pointing down.
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
const LEAP_ATTEMPTS: u32 = 5;
#[cfg(feature = "leap")]
const LEAP_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Horizontal field mapped onto the image width, in mm.
#[cfg(feature = "leap")]
const LEAP_SPAN_MM: f32 = 400.0;
/// Height above the device mapped onto the image height, in mm.
#[cfg(feature = "leap")]
const LEAP_HEIGHT_MM: f32 = 400.0;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<PerceptionMessage>) {
        use leaprs::*;

        let _ = tx.send(PerceptionMessage::Status(PerceptionStatus::Connecting));

        let connection = connect_with_retry(LEAP_ATTEMPTS, LEAP_RETRY_DELAY, || {
            let mut c = Connection::create(ConnectionConfig::default())
                .map_err(|e| ConnectFailure::Retryable(format!("{:?}", e)))?;
            c.open().map_err(|e| ConnectFailure::Retryable(format!("{:?}", e)))?;
            Ok(c)
        });
        let mut connection = match connection {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "LeapMotion unavailable");
                let _ = tx.send(PerceptionMessage::Status(PerceptionStatus::Error(e)));
                return;
            }
        };
        info!("LeapMotion connected");
        let _ = tx.send(PerceptionMessage::Status(PerceptionStatus::Ready));

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<_> = frame.hands().collect();
                let landmarks = hands.first().map(leap_landmarks).unwrap_or_default();
                if tx.send(PerceptionMessage::Frame(landmarks)).is_err() { return; }
            }
        }
    }
}

#[cfg(feature = "leap")]
fn leap_landmarks(hand: &leaprs::Hand) -> Vec<Landmark> {
    let to_image = |v: leaprs::LeapVector| {
        Landmark {
            x: 0.5 + v.x / LEAP_SPAN_MM,
            y: 1.0 - v.y / LEAP_HEIGHT_MM,
            z: v.z / LEAP_SPAN_MM,
        }
    };

    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 { return Vec::new(); }

    let mut out = Vec::with_capacity(sculpt_core::LANDMARK_COUNT);
    out.push(to_image(digits[2].metacarpal().prev_joint()));
    for d in &digits {
        out.push(to_image(d.proximal().prev_joint()));
        out.push(to_image(d.intermediate().prev_joint()));
        out.push(to_image(d.distal().prev_joint()));
        out.push(to_image(d.distal().next_joint()));
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Hand pose currently held; `None` takes the hand out of view.
    Pose(Option<HandPose>),
    /// Palm position in image space.
    Palm(Vec2),
    Quit,
}

/// Landmark source driven by [`SimInput`] events from the visualizer window.
///
/// Emits a synthetic frame every `frame_interval` regardless of how often
/// input changes, like a camera would.  Each landmark is nudged by up to
/// `jitter` in x and y to mimic tracker noise.
pub struct SimLandmarkSource {
    pub rx: Receiver<SimInput>,
    pub frame_interval: Duration,
    pub jitter: f32,
}

impl SimLandmarkSource {
    /// ~30 frames per second.
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarkSource { rx, frame_interval: Duration::from_millis(33), jitter: 0.002 }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<PerceptionMessage>) {
        info!("simulated hand tracking started");
        let _ = tx.send(PerceptionMessage::Status(PerceptionStatus::Ready));

        let mut rng = rand::thread_rng();
        let mut pose: Option<HandPose> = None;
        let mut palm = Vec2::new(0.5, 0.55);

        loop {
            loop {
                match self.rx.try_recv() {
                    Ok(SimInput::Pose(p))  => pose = p,
                    Ok(SimInput::Palm(p))  => palm = p,
                    Ok(SimInput::Quit)
                    | Err(TryRecvError::Disconnected) => return,
                    Err(TryRecvError::Empty) => break,
                }
            }
            let mut frame = pose.map(|p| p.landmarks(palm)).unwrap_or_default();
            if self.jitter > 0.0 {
                for lm in &mut frame {
                    lm.x += rng.gen_range(-self.jitter..=self.jitter);
                    lm.y += rng.gen_range(-self.jitter..=self.jitter);
                }
            }
            if tx.send(PerceptionMessage::Frame(frame)).is_err() { return; }
            thread::sleep(self.frame_interval);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use sculpt_core::LANDMARK_COUNT;

    #[test]
    fn retry_succeeds_after_failures() {
        let mut calls = 0;
        let r = connect_with_retry(3, Duration::ZERO, || {
            calls += 1;
            if calls < 3 { Err(ConnectFailure::Retryable("busy".into())) } else { Ok(calls) }
        });
        assert_eq!(r, Ok(3));
    }

    #[test]
    fn retry_window_is_bounded() {
        let mut calls = 0;
        let r: Result<(), _> = connect_with_retry(4, Duration::ZERO, || {
            calls += 1;
            Err(ConnectFailure::Retryable("down".into()))
        });
        assert_eq!(r, Err(PerceptionError::Unavailable { attempts: 4 }));
        assert_eq!(calls, 4);
    }

    #[test]
    fn denial_is_not_retried() {
        let mut calls = 0;
        let r: Result<(), _> = connect_with_retry(5, Duration::ZERO, || {
            calls += 1;
            Err(ConnectFailure::Denied)
        });
        assert_eq!(r, Err(PerceptionError::PermissionDenied));
        assert_eq!(calls, 1);
    }

    #[test]
    fn error_messages_are_distinct() {
        let a = PerceptionStatus::Error(PerceptionError::Unavailable { attempts: 5 }).to_string();
        let b = PerceptionStatus::Error(PerceptionError::PermissionDenied).to_string();
        assert_ne!(a, b);
        assert!(PerceptionStatus::Error(PerceptionError::PermissionDenied).is_terminal());
        assert!(!PerceptionStatus::Ready.is_terminal());
    }

    #[test]
    fn sim_source_follows_input() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_landmark_source(SimLandmarkSource {
            rx: sim_rx,
            frame_interval: Duration::from_millis(1),
            jitter: 0.002,
        });

        assert_eq!(rx.recv(), Ok(PerceptionMessage::Status(PerceptionStatus::Ready)));
        // No pose yet: empty frames.
        assert_eq!(rx.recv(), Ok(PerceptionMessage::Frame(Vec::new())));

        sim_tx.send(SimInput::Pose(Some(HandPose::Fist))).unwrap();
        let got_hand = rx.iter().take(200).any(|m| match m {
            PerceptionMessage::Frame(f) => f.len() == LANDMARK_COUNT,
            _ => false,
        });
        assert!(got_hand);

        sim_tx.send(SimInput::Quit).unwrap();
        // The source thread exits and drops its sender.
        assert!(rx.iter().take(10_000).count() < 10_000);
    }
}
