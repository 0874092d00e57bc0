//! The `Process` trait: cooperative, resumable units of simulated work.
//!
//! A process is a local state machine. The scheduler resumes it with a
//! [`Wake`] signal; the process runs until it reaches its next suspension
//! point and reports that point as a [`Yield`]. Processes never poll and never
//! run concurrently with each other.

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::Wake;
use crate::types::{PoolId, SimTime};

/// A suspension point reported by a process.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Yield {
    /// Request one slot of the pool and suspend until it is granted.
    ///
    /// If the slot is free the process is resumed immediately with
    /// [`Wake::Granted`], without going through the event queue.
    Request(PoolId),
    /// Suspend for the given delay and resume with [`Wake::Timeout`].
    Timeout(SimTime),
    /// The process is finished and will never be resumed again.
    Done,
}

/// The core trait that all simulated processes implement.
///
/// # Example
///
/// ```rust
/// use berthsim::{Process, SimContext, SimResult, Simulation, Wake, Yield};
///
/// /// Ticks three times, one minute apart.
/// struct Ticker {
///     ticks: u32,
/// }
///
/// impl Process for Ticker {
///     fn resume(&mut self, _ctx: &mut SimContext, _wake: Wake) -> SimResult<Yield> {
///         if self.ticks == 3 {
///             return Ok(Yield::Done);
///         }
///         self.ticks += 1;
///         Ok(Yield::Timeout(1.0))
///     }
/// }
///
/// let mut sim = Simulation::new(7);
/// sim.spawn(Box::new(Ticker { ticks: 0 })).unwrap();
/// sim.run_until(100.0).unwrap();
/// assert_eq!(sim.now(), 3.0);
/// assert_eq!(sim.active_processes(), 0);
/// ```
pub trait Process: Send {
    /// Short label used in logs.
    fn label(&self) -> String {
        "process".to_string()
    }

    /// Resume the process.
    ///
    /// # Arguments
    /// * `ctx` - The simulation context (clock, pools, RNG, observers)
    /// * `wake` - Why the process is being resumed
    ///
    /// # Returns
    /// The next suspension point, or an error that aborts the run
    fn resume(&mut self, ctx: &mut SimContext, wake: Wake) -> SimResult<Yield>;
}
