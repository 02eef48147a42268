//! Single-slot, latest-wins hand-off from perception to the simulation tick.
//!
//! Perception frames and animation ticks run on independent cadences.  The
//! continuous gesture (pinch or nothing) only matters as of the most recent
//! frame, so it lives in one overwritable slot.  One-shot gestures are queued
//! instead: a later continuous update must never swallow an edge.

use std::collections::VecDeque;

use crate::dispatch::Gesture;

/// What the tick collects from the mailbox.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inbox {
    /// Most recent `Pinch`/`None`, if any arrived since the last take.
    pub continuous: Option<Gesture>,
    /// Edge-triggered gestures in arrival order.
    pub triggers: Vec<Gesture>,
}

#[derive(Debug, Default)]
pub struct GestureMailbox {
    latest:   Option<Gesture>,
    triggers: VecDeque<Gesture>,
}

impl GestureMailbox {
    pub fn new() -> Self { Self::default() }

    pub fn post(&mut self, gesture: Gesture) {
        if gesture.is_discrete() {
            self.triggers.push_back(gesture);
        } else {
            self.latest = Some(gesture);
        }
    }

    /// Empty the mailbox.
    pub fn take(&mut self) -> Inbox {
        Inbox {
            continuous: self.latest.take(),
            triggers:   self.triggers.drain(..).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_none() && self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn pinch(s: f32) -> Gesture { Gesture::Pinch { strength: s, palm: Vec2::ZERO } }

    #[test]
    fn continuous_is_latest_wins() {
        let mut m = GestureMailbox::new();
        m.post(pinch(0.75));
        m.post(Gesture::None);
        m.post(pinch(1.0));
        assert_eq!(m.take().continuous, Some(pinch(1.0)));
        assert!(m.is_empty());
        assert_eq!(m.take(), Inbox::default());
    }

    #[test]
    fn triggers_survive_overwrite() {
        let mut m = GestureMailbox::new();
        for g in [Gesture::OneFinger, Gesture::None, Gesture::ThreeFingers, pinch(1.0)] {
            m.post(g);
        }
        let inbox = m.take();
        assert_eq!(inbox.triggers, vec![Gesture::OneFinger, Gesture::ThreeFingers]);
        assert_eq!(inbox.continuous, Some(pinch(1.0)));
    }
}
