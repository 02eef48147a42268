//! Scheduled actions on the simulated clock.
//!
//! A min-heap of `(fire_at, seq, action)`.  The tick drains whatever is due;
//! ties fire in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry<A> {
    fire_at: f64,
    seq:     u64,
    action:  A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl<A> Ord for Entry<A> {
    // Reversed: BinaryHeap is a max-heap and we want the earliest on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other.fire_at.total_cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct Scheduler<A> {
    heap:     BinaryHeap<Entry<A>>,
    next_seq: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Scheduler { heap: BinaryHeap::new(), next_seq: 0 }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self { Self::default() }

    /// Schedule `action` at absolute time `fire_at`.
    pub fn schedule(&mut self, fire_at: f64, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { fire_at, seq, action });
    }

    /// Schedule `action` `delay` seconds after `now`.
    pub fn schedule_in(&mut self, now: f64, delay: f32, action: A) {
        self.schedule(now + delay as f64, action);
    }

    /// Remove and return every action with `fire_at <= now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<A> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|e| e.fire_at <= now) {
            if let Some(e) = self.heap.pop() {
                due.push(e.action);
            }
        }
        due
    }

    /// Time of the next pending action.
    pub fn next_due(&self) -> Option<f64> { self.heap.peek().map(|e| e.fire_at) }

    pub fn len(&self)      -> usize { self.heap.len() }
    pub fn is_empty(&self) -> bool  { self.heap.is_empty() }
    pub fn clear(&mut self)         { self.heap.clear(); }
}
