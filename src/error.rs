//! Error taxonomy of the simulation core.
//!
//! Every variant is a broken contract rather than a runtime condition to
//! recover from: they abort the current run and are propagated out of
//! [`Simulation::run_until`](crate::Simulation::run_until).

use thiserror::Error;

use crate::config::ConfigError;
use crate::types::{PoolId, ProcessId, RequestId, SimTime};

/// Fatal errors raised by the scheduler, the event queue and resource pools.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// A negative or non-finite delay was passed to the scheduler.
    #[error("invalid delay {0}: delays must be finite and non-negative")]
    InvalidDelay(f64),

    /// A request was released while not currently granted.
    #[error("request {request} released on pool {pool} but it is not currently granted")]
    DoubleRelease { pool: PoolId, request: RequestId },

    /// An event scheduled in the past reached the front of the queue.
    #[error("causality violation: event at {event_time} popped at time {now}")]
    CausalityViolation { now: SimTime, event_time: SimTime },

    /// A request or yield referenced a pool that does not exist.
    #[error("unknown resource pool {0}")]
    UnknownPool(PoolId),

    /// An event targeted a process that is not (or no longer) registered.
    #[error("unknown or finished process {0}")]
    UnknownProcess(ProcessId),

    /// A process was resumed with a signal that does not match its state.
    #[error("process {0} resumed with an unexpected signal")]
    UnexpectedWake(ProcessId),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Top-level error for building and running a terminal model.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimError::InvalidDelay(-1.5);
        assert!(err.to_string().contains("-1.5"));

        let err = SimError::DoubleRelease { pool: 3, request: 9 };
        let msg = err.to_string();
        assert!(msg.contains("request 9"));
        assert!(msg.contains("pool 3"));

        let err = SimError::CausalityViolation {
            now: 10.0,
            event_time: 4.0,
        };
        assert!(err.to_string().contains("causality"));
    }

    #[test]
    fn test_top_level_error_is_transparent() {
        let err: Error = SimError::UnknownPool(2).into();
        assert_eq!(err.to_string(), "unknown resource pool 2");

        let err: Error = ConfigError::Validation("berth_capacity must be positive".into()).into();
        assert!(err.to_string().contains("berth_capacity"));
    }
}
