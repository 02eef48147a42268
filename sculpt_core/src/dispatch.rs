//! Gesture event dispatcher.
//!
//! Turns a stream of per-frame [`FingerState`]s into [`Gesture`] events:
//!
//! * one/two/three-finger gestures are **edge-triggered** — each fires once
//!   when its condition turns true and re-arms the first frame it is false;
//! * the fist is **continuous** — every fist frame emits a fresh
//!   [`Gesture::Pinch`] with the current strength and palm position;
//! * a frame with nothing recognised (or no hand at all) emits
//!   [`Gesture::None`].

use glam::Vec2;
use tracing::debug;

use crate::config::FingerThresholds;
use crate::gesture::{classify, FingerState, Landmark};

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// A gesture event, produced by the dispatcher and consumed by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// Index finger raised — cycle the color theme.
    OneFinger,
    /// Index and middle raised — start a snowfall.
    TwoFingers,
    /// Index, middle and ring raised — launch fireworks.
    ThreeFingers,
    /// Fist held — pull particles into the tree with `strength`.
    Pinch { strength: f32, palm: Vec2 },
    /// Nothing recognised this frame.
    None,
}

impl Gesture {
    /// True for the one-shot, edge-triggered variants.
    pub fn is_discrete(&self) -> bool {
        matches!(self, Gesture::OneFinger | Gesture::TwoFingers | Gesture::ThreeFingers)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Latch
// ════════════════════════════════════════════════════════════════════════════

/// Inactive/Active state for one edge-triggered gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Latch {
    active: bool,
}

impl Latch {
    /// Feed this frame's condition.  Returns true only on the rising edge.
    pub fn update(&mut self, condition: bool) -> bool {
        let fired = condition && !self.active;
        self.active = condition;
        fired
    }

    pub fn is_active(&self) -> bool { self.active }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureDispatcher
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct GestureDispatcher {
    thresholds: FingerThresholds,
    one:   Latch,
    two:   Latch,
    three: Latch,
}

impl GestureDispatcher {
    pub fn new(thresholds: FingerThresholds) -> Self {
        GestureDispatcher { thresholds, ..Default::default() }
    }

    /// Classify a raw landmark frame and dispatch it.
    pub fn observe(&mut self, landmarks: &[Landmark]) -> Vec<Gesture> {
        let state = classify(landmarks, &self.thresholds);
        self.dispatch(state.as_ref())
    }

    /// Dispatch an already-classified frame.  `None` means no hand.
    pub fn dispatch(&mut self, state: Option<&FingerState>) -> Vec<Gesture> {
        let mut out = Vec::new();

        let Some(s) = state else {
            self.one.update(false);
            self.two.update(false);
            self.three.update(false);
            out.push(Gesture::None);
            return out;
        };

        for (latch, condition, gesture) in [
            (&mut self.one,   s.is_one_finger,    Gesture::OneFinger),
            (&mut self.two,   s.is_two_fingers,   Gesture::TwoFingers),
            (&mut self.three, s.is_three_fingers, Gesture::ThreeFingers),
        ] {
            if latch.update(condition) {
                debug!(?gesture, "gesture edge");
                out.push(gesture);
            }
        }

        if let Some(strength) = s.fist_strength() {
            out.push(Gesture::Pinch { strength, palm: s.palm });
        }

        if !s.any() {
            out.push(Gesture::None);
        }
        out
    }

    /// Latch states in one/two/three order.
    pub fn latches(&self) -> [bool; 3] {
        [self.one.is_active(), self.two.is_active(), self.three.is_active()]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::HandPose;

    const PALM: Vec2 = Vec2::new(0.4, 0.5);

    #[test]
    fn latch_fires_on_rising_edges_only() {
        let signal = [false, false, true, true, true, false, true];
        let mut latch = Latch::default();
        let fired: Vec<usize> = signal.iter().enumerate()
            .filter(|(_, c)| latch.update(**c))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(fired, vec![2, 6]);
    }

    #[test]
    fn held_pose_fires_once() {
        let mut d = GestureDispatcher::default();
        let poses = [
            HandPose::Open, HandPose::Open,
            HandPose::ThreeFingers, HandPose::ThreeFingers, HandPose::ThreeFingers,
            HandPose::Open,
            HandPose::ThreeFingers,
        ];
        let fired: Vec<usize> = poses.iter().enumerate()
            .filter(|(_, p)| d.observe(&p.landmarks(PALM)).contains(&Gesture::ThreeFingers))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(fired, vec![2, 6]);
    }

    #[test]
    fn latches_are_independent() {
        let mut d = GestureDispatcher::default();
        assert_eq!(d.observe(&HandPose::OneFinger.landmarks(PALM)), vec![Gesture::OneFinger]);
        // Switching straight to two fingers fires two without re-firing one.
        assert_eq!(d.observe(&HandPose::TwoFingers.landmarks(PALM)), vec![Gesture::TwoFingers]);
        assert_eq!(d.latches(), [false, true, false]);
        // Back to one finger: its latch re-armed on the previous frame.
        assert_eq!(d.observe(&HandPose::OneFinger.landmarks(PALM)), vec![Gesture::OneFinger]);
    }

    #[test]
    fn held_finger_emits_nothing() {
        let mut d = GestureDispatcher::default();
        d.observe(&HandPose::TwoFingers.landmarks(PALM));
        assert!(d.observe(&HandPose::TwoFingers.landmarks(PALM)).is_empty());
    }

    #[test]
    fn fist_is_continuous() {
        let mut d = GestureDispatcher::default();
        for _ in 0..5 {
            let out = d.observe(&HandPose::Fist.landmarks(PALM));
            assert_eq!(out, vec![Gesture::Pinch { strength: 1.0, palm: PALM }]);
        }
        let out = d.observe(&HandPose::Grip.landmarks(PALM));
        assert_eq!(out, vec![Gesture::Pinch { strength: 0.75, palm: PALM }]);
    }

    #[test]
    fn missing_hand_is_no_gesture_and_rearms() {
        let mut d = GestureDispatcher::default();
        d.observe(&HandPose::OneFinger.landmarks(PALM));
        assert_eq!(d.observe(&[]), vec![Gesture::None]);
        assert_eq!(d.latches(), [false, false, false]);
        assert_eq!(d.observe(&HandPose::OneFinger.landmarks(PALM)), vec![Gesture::OneFinger]);
    }

    #[test]
    fn open_hand_is_no_gesture() {
        let mut d = GestureDispatcher::default();
        assert_eq!(d.observe(&HandPose::Open.landmarks(PALM)), vec![Gesture::None]);
    }

    #[test]
    fn discrete_variants() {
        assert!(Gesture::OneFinger.is_discrete());
        assert!(!Gesture::None.is_discrete());
        assert!(!Gesture::Pinch { strength: 1.0, palm: Vec2::ZERO }.is_discrete());
    }
}
