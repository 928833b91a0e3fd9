//! Simulation clock and one-shot timers
//!
//! Timers carry plain data events rather than closures. The owner drains due
//! events once per tick and dispatches them itself, so an event can only
//! refer to an entity through a `Handle` captured when it was scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Simulation time in milliseconds
pub type Millis = u64;

#[derive(Debug, Clone)]
struct Scheduled<E> {
    due: Millis,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    // Reversed so the max-heap pops the earliest (due, seq) first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Monotonic clock with a queue of delayed events
#[derive(Debug, Clone)]
pub struct Timers<E> {
    now: Millis,
    next_seq: u64,
    queue: BinaryHeap<Scheduled<E>>,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current simulation time
    #[inline]
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Move the clock forward. Time never runs backwards.
    pub fn advance_to(&mut self, now: Millis) {
        if now < self.now {
            log::warn!("Clock asked to go back from {} to {}, ignoring", self.now, now);
            return;
        }
        self.now = now;
    }

    /// Queue `event` to fire `delay` ms from now
    pub fn schedule(&mut self, delay: Millis, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            due: self.now.saturating_add(delay),
            seq,
            event,
        });
    }

    /// Remove every event due at or before `now`, earliest first.
    ///
    /// Ties keep scheduling order. Anything scheduled while the returned batch
    /// is handled lands in the queue and is seen on the next call.
    pub fn take_due(&mut self) -> Vec<E> {
        let mut due = Vec::new();
        while self.queue.peek().is_some_and(|s| s.due <= self.now) {
            if let Some(scheduled) = self.queue.pop() {
                due.push(scheduled.event);
            }
        }
        due
    }

    /// Number of events still waiting
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending event
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.peek().map(|s| s.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let mut timers = Timers::new();
        timers.schedule(300, "boom");

        timers.advance_to(299);
        assert!(timers.take_due().is_empty());

        timers.advance_to(300);
        assert_eq!(timers.take_due(), vec!["boom"]);

        timers.advance_to(1000);
        assert!(timers.take_due().is_empty());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_due_order_with_fifo_ties() {
        let mut timers = Timers::new();
        timers.schedule(50, 'c');
        timers.schedule(10, 'a');
        timers.schedule(50, 'd');
        timers.schedule(10, 'b');

        timers.advance_to(100);
        assert_eq!(timers.take_due(), vec!['a', 'b', 'c', 'd']);
    }

    #[test]
    fn test_nested_schedule_waits_for_next_tick() {
        let mut timers = Timers::new();
        timers.schedule(0, 1);
        timers.advance_to(16);

        for event in timers.take_due() {
            assert_eq!(event, 1);
            // Zero-delay follow-up from inside a handler
            timers.schedule(0, 2);
        }
        assert_eq!(timers.pending(), 1);

        timers.advance_to(32);
        assert_eq!(timers.take_due(), vec![2]);
    }

    #[test]
    fn test_delay_is_relative_to_now() {
        let mut timers = Timers::new();
        timers.advance_to(600);
        timers.schedule(400, ());
        assert_eq!(timers.next_due(), Some(1000));
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut timers: Timers<()> = Timers::new();
        timers.advance_to(500);
        timers.advance_to(200);
        assert_eq!(timers.now(), 500);
    }
}
