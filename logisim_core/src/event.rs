//! Events and the time-ordered queue that drives the kernel.

use crate::error::{SimError, SimResult};
use crate::signal::SignalId;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// Simulated time, in picoseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// `self + delay`, saturating rather than overflowing at `u64::MAX`.
    pub fn add_delay(self, delay: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(delay))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(t: u64) -> Self {
        Timestamp(t)
    }
}

/// A scheduled signal write: "at `time`, `signal_id` becomes `new_value`".
///
/// Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub time: Timestamp,
    pub signal_id: SignalId,
    pub new_value: Value,
}

impl Event {
    pub fn new(time: Timestamp, signal_id: SignalId, new_value: Value) -> Self {
        Event {
            time,
            signal_id,
            new_value,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event(time={}, signal={}, value={})",
            self.time, self.signal_id, self.new_value
        )
    }
}

/// Ordered solely by `time`, ascending. Events sharing a timestamp compare
/// equal for ordering purposes — the kernel's same-timestamp batching
/// (§4.H) removes any observable dependence on how such ties break, so no
/// secondary key is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry(Event);

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so a `BinaryHeap` (a max-heap) behaves as a min-heap on time.
        other.0.time.cmp(&self.0.time)
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Time-ordered priority queue of pending [`Event`]s.
///
/// `schedule` always succeeds; `pop_next`/`peek_time` fail with
/// [`SimError::Empty`] when the queue is drained. Expected amortized
/// complexity is `O(log n)` per `schedule`/`pop_next`.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueueEntry>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            heap: BinaryHeap::new(),
        }
    }

    /// Schedule `event`. Always succeeds.
    pub fn schedule(&mut self, event: Event) {
        self.heap.push(QueueEntry(event));
    }

    /// Pop and return the earliest-scheduled event.
    pub fn pop_next(&mut self) -> SimResult<Event> {
        self.heap.pop().map(|entry| entry.0).ok_or(SimError::Empty)
    }

    /// The timestamp of the earliest-scheduled event, without popping it.
    pub fn peek_time(&self) -> SimResult<Timestamp> {
        self.heap.peek().map(|entry| entry.0.time).ok_or(SimError::Empty)
    }

    /// The timestamp of the earliest-scheduled event, if any.
    pub(crate) fn peek_time_opt(&self) -> Option<Timestamp> {
        self.heap.peek().map(|entry| entry.0.time)
    }

    /// Number of pending events.
    pub fn size(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue has no pending events.
    pub fn empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop all pending events.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(t: u64) -> Event {
        Event::new(Timestamp(t), SignalId(0), Value::Unknown)
    }

    #[test]
    fn empty_queue_fails_peek_and_pop() {
        let mut q = EventQueue::new();
        assert!(q.empty());
        assert!(matches!(q.peek_time(), Err(SimError::Empty)));
        assert!(matches!(q.pop_next(), Err(SimError::Empty)));
    }

    #[test]
    fn pops_in_nondecreasing_time_order() {
        let mut q = EventQueue::new();
        for t in [50, 10, 30, 10, 0, 999] {
            q.schedule(ev(t));
        }
        let mut times = Vec::new();
        while !q.empty() {
            times.push(q.pop_next().unwrap().time.0);
        }
        let mut sorted = times.clone();
        sorted.sort_unstable();
        assert_eq!(times, sorted);
    }

    #[test]
    fn size_tracks_pending_events() {
        let mut q = EventQueue::new();
        assert_eq!(q.size(), 0);
        q.schedule(ev(1));
        q.schedule(ev(2));
        assert_eq!(q.size(), 2);
        q.pop_next().unwrap();
        assert_eq!(q.size(), 1);
    }

    proptest::proptest! {
        #[test]
        fn queue_ordering_holds_for_random_streams(times in proptest::collection::vec(0u64..1_000_000, 0..2000)) {
            let mut q = EventQueue::new();
            for &t in &times {
                q.schedule(ev(t));
            }
            let mut popped = Vec::with_capacity(times.len());
            while !q.empty() {
                popped.push(q.pop_next().unwrap().time.0);
            }
            for w in popped.windows(2) {
                assert!(w[0] <= w[1]);
            }
            assert_eq!(popped.len(), times.len());
        }
    }
}
