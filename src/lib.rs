//! # berthsim
//!
//! A discrete-event simulation of a container terminal. Vessels arrive at
//! random intervals, compete for berths, cranes and trucks, and release them
//! as their cargo is unloaded.
//!
//! ## Design Principles
//!
//! - **Event Queue**: A single clock and a queue of events ordered by
//!   `(time, sequence)`. Events at the same instant fire in the order they
//!   were scheduled.
//! - **Processes as State Machines**: Each entity is a [`Process`] that is
//!   resumed with a [`Wake`] signal and answers with its next suspension
//!   point ([`Yield`]): a resource request, a timed delay, or completion.
//! - **Fair Resource Pools**: [`ResourcePool`] grants slots strictly in
//!   request order and hands freed slots to waiters through the event queue.
//! - **Explicit Context**: All state lives in a [`SimContext`] passed to every
//!   process. There are no globals, so many simulations can run side by side.
//! - **Reproducibility**: The random source is a seeded `ChaCha8Rng`; a fixed
//!   seed and configuration always produce the same observations.
//!
//! ## Features
//!
//! - `parallel` - Run independent replications on a rayon thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use berthsim::{EventLog, TerminalConfig, TerminalModel, TerminalEvent};
//!
//! let mut model = TerminalModel::new(TerminalConfig::default()).unwrap();
//! let log = EventLog::new();
//! model.add_observer(Box::new(log.clone()));
//!
//! let stats = model.run().unwrap();
//! println!("{}", stats.summary());
//!
//! let berthed = log
//!     .records()
//!     .iter()
//!     .filter(|o| o.event == TerminalEvent::VesselBerthed)
//!     .count();
//! assert!(berthed >= 1);
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use berthsim::TerminalConfig;
//!
//! let config = TerminalConfig::from_file("terminal.yaml")?;
//! let stats = berthsim::TerminalModel::new(config)?.run()?;
//! ```

pub mod types;
pub mod error;
pub mod event;
pub mod resource;
pub mod process;
pub mod context;
pub mod executor;
pub mod observe;
pub mod config;
pub mod stats;
pub mod terminal;
pub mod replicate;

// Re-export commonly used types
pub use types::{PoolId, ProcessId, RequestId, SimTime, VesselId};
pub use error::{Error, SimError, SimResult};
pub use event::{Event, Wake};
pub use resource::{Request, RequestState, ResourcePool};
pub use process::{Process, Yield};
pub use context::{SimContext, SimRng};
pub use executor::{EventQueue, Simulation};
pub use observe::{EventLog, Observation, Observer, TerminalEvent, TracingObserver};
pub use config::{ConfigError, TerminalConfig, TerminalConfigBuilder};
pub use stats::{EventCounts, PoolStats, RunStats, Timer};
pub use terminal::{ArrivalGenerator, BerthingProcess, TerminalModel, TerminalPools, Timings, UnloadingProcess, Vessel};
pub use replicate::run_replications;

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging. `RUST_LOG`
/// takes precedence over `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// berthsim::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
