//! Event definitions for the simulation framework.
//!
//! An event is a scheduled resumption of one process: it carries the time at
//! which it fires, a sequence number that breaks ties between events at the
//! same instant, and the [`Wake`] signal handed to the process when it fires.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::resource::Request;
use crate::types::{ProcessId, SimTime};

/// The signal delivered to a process when it is resumed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Wake {
    /// First resumption after the process was spawned.
    Start,
    /// A timed delay requested with [`Yield::Timeout`](crate::Yield::Timeout) elapsed.
    Timeout,
    /// A pool request has been granted. The handle is in the granted state.
    Granted(Request),
}

/// Represents a scheduled event in the simulation.
///
/// Events are immutable once created and are consumed exactly once. They are
/// totally ordered by `(time, seq)`, so events sharing a timestamp fire in the
/// order they were scheduled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    /// The simulation time at which this event fires
    pub time: SimTime,
    /// Monotonic creation counter used as a tie-breaker
    pub seq: u64,
    /// The process to resume
    pub target: ProcessId,
    /// The signal passed to the process on resumption
    pub wake: Wake,
}

impl Event {
    /// Creates a new event.
    pub fn new(time: SimTime, seq: u64, target: ProcessId, wake: Wake) -> Self {
        Self {
            time,
            seq,
            target,
            wake,
        }
    }

    /// Returns the ordering key of this event.
    pub fn key(&self) -> (SimTime, u64) {
        (self.time, self.seq)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = Event::new(12.5, 3, 7, Wake::Timeout);

        assert_eq!(event.time, 12.5);
        assert_eq!(event.seq, 3);
        assert_eq!(event.target, 7);
        assert_eq!(event.wake, Wake::Timeout);
        assert_eq!(event.key(), (12.5, 3));
    }

    #[test]
    fn test_ordering_by_time_then_sequence() {
        let early = Event::new(1.0, 10, 1, Wake::Start);
        let late = Event::new(2.0, 0, 1, Wake::Start);
        let tie_first = Event::new(2.0, 1, 2, Wake::Start);
        let tie_second = Event::new(2.0, 2, 3, Wake::Start);

        assert!(early < late);
        assert!(late < tie_first);
        assert!(tie_first < tie_second);
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new(0.1, 5, 2, Wake::Start);
        let json = serde_json::to_string(&event).unwrap();
        let restored: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.key(), event.key());
        assert_eq!(restored.target, 2);
    }
}
