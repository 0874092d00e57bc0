//! The simulation clock and its time-ordered event queue.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{SimError, SimResult};
use crate::event::{Event, Wake};
use crate::types::{ProcessId, SimTime};

/// Pending events ordered by `(time, seq)` together with the current time.
///
/// The queue owns the clock: `now` only changes when an event is popped, and
/// it never moves backwards.
#[derive(Debug, Default)]
pub struct EventQueue {
    /// Min-heap of pending events
    heap: BinaryHeap<Reverse<Event>>,
    /// Current simulation time
    now: SimTime,
    /// Sequence number handed to the next scheduled event
    next_seq: u64,
    /// Number of events popped so far
    popped: u64,
    /// Largest number of events pending at once
    peak_len: usize,
}

impl EventQueue {
    /// Creates an empty queue with the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current simulation time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedules `wake` for `target` at `now + delay`.
    ///
    /// # Arguments
    /// * `delay` - Non-negative, finite offset from the current time
    /// * `target` - The process to resume
    /// * `wake` - The signal passed to the process
    ///
    /// # Errors
    /// Returns [`SimError::InvalidDelay`] for a negative, NaN or infinite delay.
    pub fn schedule(&mut self, delay: SimTime, target: ProcessId, wake: Wake) -> SimResult<Event> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(SimError::InvalidDelay(delay));
        }

        let event = Event::new(self.now + delay, self.next_seq, target, wake);
        self.next_seq += 1;
        self.heap.push(Reverse(event.clone()));
        self.peak_len = self.peak_len.max(self.heap.len());
        Ok(event)
    }

    /// Pops the earliest event if it fires at or before `horizon`.
    ///
    /// Events beyond the horizon are left in the queue untouched. Popping an
    /// event advances the clock to that event's time.
    ///
    /// # Errors
    /// Returns [`SimError::CausalityViolation`] if the earliest event lies
    /// before the current time.
    pub fn pop_due(&mut self, horizon: SimTime) -> SimResult<Option<Event>> {
        match self.heap.peek() {
            Some(Reverse(next)) if next.time <= horizon => {}
            _ => return Ok(None),
        }
        let Some(Reverse(event)) = self.heap.pop() else {
            return Ok(None);
        };

        if event.time < self.now {
            return Err(SimError::CausalityViolation {
                now: self.now,
                event_time: event.time,
            });
        }

        self.now = event.time;
        self.popped += 1;
        Ok(Some(event))
    }

    /// Returns the time of the earliest pending event.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(event)| event.time)
    }

    /// Returns the number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the number of events consumed so far.
    pub fn popped(&self) -> u64 {
        self.popped
    }

    /// Returns the largest number of events that were pending at once.
    pub fn peak_len(&self) -> usize {
        self.peak_len
    }

    /// Pushes an event without the delay check.
    #[cfg(test)]
    pub(crate) fn push_unchecked(&mut self, event: Event) {
        self.heap.push(Reverse(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_queue() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.now(), 0.0);
        assert!(queue.is_empty());
        assert_eq!(queue.pop_due(100.0).unwrap(), None);
    }

    #[test]
    fn test_schedule_relative_to_now() {
        let mut queue = EventQueue::new();
        queue.schedule(5.0, 1, Wake::Start).unwrap();
        queue.pop_due(10.0).unwrap().unwrap();
        assert_eq!(queue.now(), 5.0);

        let event = queue.schedule(2.5, 1, Wake::Timeout).unwrap();
        assert_eq!(event.time, 7.5);
    }

    #[test]
    fn test_invalid_delay() {
        let mut queue = EventQueue::new();
        assert_eq!(
            queue.schedule(-1.0, 1, Wake::Start).unwrap_err(),
            SimError::InvalidDelay(-1.0)
        );
        assert!(matches!(
            queue.schedule(f64::NAN, 1, Wake::Start),
            Err(SimError::InvalidDelay(_))
        ));
        assert!(matches!(
            queue.schedule(f64::INFINITY, 1, Wake::Start),
            Err(SimError::InvalidDelay(_))
        ));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_order_with_ties() {
        let mut queue = EventQueue::new();
        queue.schedule(3.0, 1, Wake::Start).unwrap();
        queue.schedule(1.0, 2, Wake::Start).unwrap();
        queue.schedule(3.0, 3, Wake::Start).unwrap();
        queue.schedule(1.0, 4, Wake::Start).unwrap();

        let mut order = Vec::new();
        while let Some(event) = queue.pop_due(f64::INFINITY).unwrap() {
            order.push(event.target);
        }
        assert_eq!(order, vec![2, 4, 1, 3]);
        assert_eq!(queue.popped(), 4);
        assert_eq!(queue.peak_len(), 4);
    }

    #[test]
    fn test_horizon_leaves_future_events() {
        let mut queue = EventQueue::new();
        queue.schedule(10.0, 1, Wake::Start).unwrap();
        queue.schedule(20.0, 2, Wake::Start).unwrap();

        assert_eq!(queue.pop_due(10.0).unwrap().map(|e| e.target), Some(1));
        assert_eq!(queue.pop_due(10.0).unwrap(), None);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek_time(), Some(20.0));
        assert_eq!(queue.now(), 10.0);

        assert_eq!(queue.pop_due(25.0).unwrap().map(|e| e.target), Some(2));
    }

    #[test]
    fn test_causality_violation() {
        let mut queue = EventQueue::new();
        queue.schedule(5.0, 1, Wake::Start).unwrap();
        queue.pop_due(5.0).unwrap();

        // Only reachable by bypassing `schedule`.
        queue.push_unchecked(Event::new(1.0, 99, 2, Wake::Start));

        assert_eq!(
            queue.pop_due(10.0).unwrap_err(),
            SimError::CausalityViolation {
                now: 5.0,
                event_time: 1.0
            }
        );
    }
}
