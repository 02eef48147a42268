//! Gesture classification from one frame of hand landmarks.
//!
//! Input is the 21-point hand layout used by common hand-tracking models:
//!
//! ```text
//!   0 wrist
//!   1–4   thumb  (4 = tip)
//!   5–8   index  (8 = tip)
//!   9–12  middle (9 = palm base, 12 = tip)
//!  13–16  ring   (16 = tip)
//!  17–20  pinky  (20 = tip)
//! ```
//!
//! Coordinates are normalised image space (`x`, `y` in `[0, 1]`, `y` grows
//! downward).  Classification only compares fingertip heights against the
//! palm base, so it is cheap and rotation-naive by design of the thresholds.

use glam::Vec2;

use crate::config::{FingerThresholds, Threshold};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_TIP:  usize = 8;
pub const PALM_BASE:  usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP:   usize = 16;
pub const PINKY_TIP:  usize = 20;

/// One tracked hand point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerState
// ════════════════════════════════════════════════════════════════════════════

/// Per-finger flags plus the derived gestures for one frame.
///
/// Finger arrays are ordered thumb, index, middle, ring, pinky.
#[derive(Clone, Debug, PartialEq)]
pub struct FingerState {
    pub curled:   [bool; 5],
    pub extended: [bool; 5],
    /// Curled fingers among index, middle, ring and pinky.
    pub fingers_curled: u8,
    pub is_fist:          bool,
    pub is_one_finger:    bool,
    pub is_two_fingers:   bool,
    pub is_three_fingers: bool,
    /// Palm base position in image space.
    pub palm: Vec2,
}

impl FingerState {
    pub fn thumb_curled(&self) -> bool { self.curled[0] }

    /// Grip strength while a fist is held: the curled-finger ratio.
    ///
    /// Always in `[0.75, 1.0]` when present, since a fist needs three of the
    /// four fingers curled.
    pub fn fist_strength(&self) -> Option<f32> {
        self.is_fist.then(|| self.fingers_curled as f32 / 4.0)
    }

    /// Whether any gesture at all was recognised.
    pub fn any(&self) -> bool {
        self.is_fist || self.is_one_finger || self.is_two_fingers || self.is_three_fingers
    }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Classify one frame.  Returns `None` for a missing or short landmark set.
pub fn classify(landmarks: &[Landmark], thresholds: &FingerThresholds) -> Option<FingerState> {
    if landmarks.len() < LANDMARK_COUNT {
        return None;
    }

    let palm = landmarks[PALM_BASE];
    let tips = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
    let limits: [Threshold; 5] = [
        thresholds.thumb,
        thresholds.index,
        thresholds.middle,
        thresholds.ring,
        thresholds.pinky,
    ];

    let mut curled   = [false; 5];
    let mut extended = [false; 5];
    for (f, (&tip, limit)) in tips.iter().zip(limits.iter()).enumerate() {
        let dy = (landmarks[tip].y - palm.y).abs();
        curled[f]   = dy < limit.curl;
        extended[f] = dy > limit.extend;
    }

    let fingers_curled = curled[1..].iter().filter(|c| **c).count() as u8;
    let [_, index, middle, ring, pinky] = extended;

    Some(FingerState {
        curled,
        extended,
        fingers_curled,
        is_fist:          fingers_curled >= 3 && curled[0],
        is_one_finger:    index && !middle && !ring && !pinky,
        is_two_fingers:   index && middle && !ring && !pinky,
        is_three_fingers: index && middle && ring && !pinky,
        palm: Vec2::new(palm.x, palm.y),
    })
}

// ════════════════════════════════════════════════════════════════════════════
// HandPose — synthetic hands for simulation input and tests
// ════════════════════════════════════════════════════════════════════════════

/// A canned hand shape that can be expanded into a full landmark frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandPose {
    /// All five fingers up; no gesture.
    Open,
    /// Every finger and the thumb curled (strength 1.0).
    Fist,
    /// Three fingers and the thumb curled, index half-bent (strength 0.75).
    Grip,
    OneFinger,
    TwoFingers,
    ThreeFingers,
}

// Fingertip height above (−) or below (+) the palm base, thumb → pinky.
const UP:   f32 = -0.22;
const DOWN: f32 =  0.02;
const HALF: f32 =  0.11;
// Thumb tucked beside the palm: neither curled nor extended.
const THUMB_ASIDE: f32 = 0.13;

// Horizontal offset of each finger's knuckle from the palm base.
const KNUCKLE_X: [f32; 5] = [-0.09, -0.03, 0.0, 0.03, 0.055];

impl HandPose {
    fn tip_offsets(self) -> [f32; 5] {
        match self {
            HandPose::Open         => [-0.18, UP,   UP,   UP,   UP  ],
            HandPose::Fist         => [ 0.03, DOWN, DOWN, DOWN, DOWN],
            HandPose::Grip         => [ 0.03, HALF, DOWN, DOWN, DOWN],
            HandPose::OneFinger    => [THUMB_ASIDE, UP, DOWN, DOWN, DOWN],
            HandPose::TwoFingers   => [THUMB_ASIDE, UP, UP,   DOWN, DOWN],
            HandPose::ThreeFingers => [THUMB_ASIDE, UP, UP,   UP,   DOWN],
        }
    }

    /// Expand into 21 landmarks with the palm base at `palm`.
    pub fn landmarks(self, palm: Vec2) -> Vec<Landmark> {
        let mut out = vec![Landmark::default(); LANDMARK_COUNT];
        out[WRIST] = Landmark::new(palm.x, palm.y + 0.15);

        for (f, &dy) in self.tip_offsets().iter().enumerate() {
            let knuckle = Vec2::new(palm.x + KNUCKLE_X[f], palm.y);
            let tip     = Vec2::new(knuckle.x, palm.y + dy);
            // Joints 1..=4 of finger f sit at indices 4f+1 ..= 4f+4.
            for k in 0..4 {
                let p = knuckle.lerp(tip, k as f32 / 3.0);
                out[4 * f + 1 + k] = Landmark::new(p.x, p.y);
            }
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
