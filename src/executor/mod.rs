//! The process scheduler.
//!
//! A [`Simulation`] owns the [`SimContext`] and every live process. Its loop
//! pops events in `(time, seq)` order and resumes the target process with the
//! event's [`Wake`] signal, then acts on the [`Yield`] the process returns:
//!
//! - `Timeout(d)`: schedule a `Wake::Timeout` at `now + d`
//! - `Request(pool)`: issue the request; if granted on the spot, resume the
//!   process again right away, otherwise leave it suspended until a release
//!   hands it the slot
//! - `Done`: drop the process
//!
//! Execution is single-threaded and cooperative: exactly one process runs at
//! a time, and only the event loop mutates the clock and the pools.

pub mod queue;

use std::collections::HashMap;

use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::Wake;
use crate::observe::Observer;
use crate::process::{Process, Yield};
use crate::stats::RunStats;
use crate::types::{PoolId, ProcessId, SimTime};

pub use queue::EventQueue;

/// A single simulation run.
///
/// # Example
///
/// ```ignore
/// let mut sim = Simulation::new(42);
/// let berth = sim.add_pool("berth", 2);
/// sim.spawn(Box::new(MyProcess::new(berth)))?;
/// sim.run_until(1440.0)?;
/// ```
pub struct Simulation {
    /// Clock, pools, RNG and observers
    ctx: SimContext,
    /// Live processes indexed by their ID
    processes: HashMap<ProcessId, Box<dyn Process>>,
    /// Total number of process resumptions
    resumptions: u64,
    /// Number of processes that reached `Yield::Done`
    finished: u64,
}

impl Simulation {
    /// Creates a simulation whose random source is seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_context(SimContext::new(seed))
    }

    /// Creates a simulation around an existing context.
    pub fn with_context(ctx: SimContext) -> Self {
        Self {
            ctx,
            processes: HashMap::new(),
            resumptions: 0,
            finished: 0,
        }
    }

    /// Returns the current simulation time.
    pub fn now(&self) -> SimTime {
        self.ctx.now()
    }

    /// Returns the simulation context.
    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// Returns the simulation context mutably.
    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    /// Adds a resource pool. See [`SimContext::add_pool`].
    pub fn add_pool(&mut self, name: impl Into<String>, capacity: usize) -> PoolId {
        self.ctx.add_pool(name, capacity)
    }

    /// Registers an observer. See [`SimContext::add_observer`].
    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.ctx.add_observer(observer);
    }

    /// Spawns a top-level process. It starts when the loop reaches it.
    pub fn spawn(&mut self, process: Box<dyn Process>) -> SimResult<ProcessId> {
        let id = self.ctx.spawn(process)?;
        self.adopt_spawned();
        Ok(id)
    }

    /// Returns the number of processes that have not finished.
    pub fn active_processes(&self) -> usize {
        self.processes.len()
    }

    /// Returns the total number of process resumptions.
    pub fn resumptions(&self) -> u64 {
        self.resumptions
    }

    /// Returns the number of events still pending.
    pub fn pending_events(&self) -> usize {
        self.ctx.queue().len()
    }

    /// Processes every event scheduled at or before `horizon`.
    ///
    /// Stops when the queue is empty or the next event lies beyond the
    /// horizon; such events stay queued, so a later call with a larger
    /// horizon continues the run. Processes still suspended are simply not
    /// resumed.
    ///
    /// # Returns
    /// The number of events consumed by this call
    ///
    /// # Errors
    /// Any [`SimError`] raised by the queue, a pool or a process aborts the run.
    pub fn run_until(&mut self, horizon: SimTime) -> SimResult<u64> {
        tracing::debug!(horizon, now = self.now(), pending = self.pending_events(), "run started");
        let mut consumed = 0;

        while let Some(event) = self.ctx.pop_due(horizon)? {
            consumed += 1;
            self.dispatch(event.target, event.wake)?;
        }

        tracing::debug!(
            horizon,
            now = self.now(),
            consumed,
            pending = self.pending_events(),
            "run stopped"
        );
        Ok(consumed)
    }

    /// Processes the next event regardless of its time.
    ///
    /// # Returns
    /// `false` if the queue was empty
    pub fn step(&mut self) -> SimResult<bool> {
        match self.ctx.pop_due(SimTime::INFINITY)? {
            Some(event) => {
                self.dispatch(event.target, event.wake)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Resumes `process` with `wake` and follows it through every suspension
    /// point that can be satisfied without advancing time.
    fn dispatch(&mut self, process: ProcessId, mut wake: Wake) -> SimResult<()> {
        loop {
            let target = self
                .processes
                .get_mut(&process)
                .ok_or(SimError::UnknownProcess(process))?;

            self.ctx.set_current(Some(process));
            let outcome = target.resume(&mut self.ctx, wake);
            self.ctx.set_current(None);
            self.resumptions += 1;
            self.adopt_spawned();

            match outcome? {
                Yield::Timeout(delay) => {
                    self.ctx.schedule(delay, process, Wake::Timeout)?;
                    return Ok(());
                }
                Yield::Request(pool) => {
                    let request = self.ctx.request(pool, process)?;
                    if !request.is_granted() {
                        return Ok(());
                    }
                    wake = Wake::Granted(request);
                }
                Yield::Done => {
                    self.processes.remove(&process);
                    self.finished += 1;
                    tracing::debug!(process, time = self.now(), "finished");
                    return Ok(());
                }
            }
        }
    }

    fn adopt_spawned(&mut self) {
        for (id, process) in self.ctx.take_spawned() {
            self.processes.insert(id, process);
        }
    }

    /// Collects run statistics.
    pub fn stats(&self) -> RunStats {
        let queue = self.ctx.queue();
        RunStats {
            final_time: self.now(),
            events_processed: queue.popped(),
            events_pending: queue.len(),
            peak_queue_size: queue.peak_len(),
            resumptions: self.resumptions,
            processes_spawned: self.ctx.spawned_count(),
            processes_finished: self.finished,
            counts: self.ctx.counts().clone(),
            pools: self.ctx.pools().iter().map(|p| p.stats().clone()).collect(),
            ..RunStats::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::resource::Request;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records the time of every resumption.
    struct Sleeper {
        delays: Vec<SimTime>,
        woken_at: Arc<Mutex<Vec<SimTime>>>,
    }

    impl Process for Sleeper {
        fn resume(&mut self, ctx: &mut SimContext, _wake: Wake) -> SimResult<Yield> {
            self.woken_at.lock().push(ctx.now());
            match self.delays.pop() {
                Some(delay) => Ok(Yield::Timeout(delay)),
                None => Ok(Yield::Done),
            }
        }
    }

    /// Takes one slot, holds it, releases it.
    struct Holder {
        pool: PoolId,
        hold: SimTime,
        held: Option<Request>,
    }

    impl Process for Holder {
        fn resume(&mut self, ctx: &mut SimContext, wake: Wake) -> SimResult<Yield> {
            match wake {
                Wake::Start => Ok(Yield::Request(self.pool)),
                Wake::Granted(request) => {
                    self.held = Some(request);
                    Ok(Yield::Timeout(self.hold))
                }
                Wake::Timeout => {
                    if let Some(request) = self.held.take() {
                        ctx.release(&request)?;
                    }
                    Ok(Yield::Done)
                }
            }
        }
    }

    #[test]
    fn test_empty_run() {
        let mut sim = Simulation::new(0);
        assert_eq!(sim.run_until(100.0).unwrap(), 0);
        assert_eq!(sim.resumptions(), 0);
        assert_eq!(sim.now(), 0.0);
    }

    #[test]
    fn test_timeouts_advance_clock() {
        let woken_at = Arc::new(Mutex::new(Vec::new()));
        let mut sim = Simulation::new(0);
        sim.spawn(Box::new(Sleeper {
            delays: vec![2.0, 1.5],
            woken_at: woken_at.clone(),
        }))
        .unwrap();

        sim.run_until(100.0).unwrap();

        assert_eq!(*woken_at.lock(), vec![0.0, 1.5, 3.5]);
        assert_eq!(sim.active_processes(), 0);
        assert_eq!(sim.stats().processes_finished, 1);
    }

    #[test]
    fn test_immediate_grant_does_not_suspend() {
        let mut sim = Simulation::new(0);
        let pool = sim.add_pool("berth", 1);
        sim.spawn(Box::new(Holder {
            pool,
            hold: 4.0,
            held: None,
        }))
        .unwrap();

        // Start event only; the grant is handled inline.
        sim.step().unwrap();
        assert_eq!(sim.context().pool(pool).unwrap().in_use(), 1);
        assert_eq!(sim.resumptions(), 2);
        assert_eq!(sim.pending_events(), 1);

        sim.run_until(10.0).unwrap();
        assert_eq!(sim.context().pool(pool).unwrap().in_use(), 0);
        assert_eq!(sim.now(), 4.0);
    }

    #[test]
    fn test_negative_timeout_aborts_run() {
        let woken_at = Arc::new(Mutex::new(Vec::new()));
        let mut sim = Simulation::new(0);
        sim.spawn(Box::new(Sleeper {
            delays: vec![-1.0],
            woken_at,
        }))
        .unwrap();

        assert_eq!(sim.run_until(10.0).unwrap_err(), SimError::InvalidDelay(-1.0));
    }

    #[test]
    fn test_request_on_missing_pool_aborts_run() {
        let mut sim = Simulation::new(0);
        sim.spawn(Box::new(Holder {
            pool: 5,
            hold: 1.0,
            held: None,
        }))
        .unwrap();

        assert_eq!(sim.run_until(10.0).unwrap_err(), SimError::UnknownPool(5));
    }

    #[test]
    fn test_resume_after_horizon() {
        let woken_at = Arc::new(Mutex::new(Vec::new()));
        let mut sim = Simulation::new(0);
        sim.spawn(Box::new(Sleeper {
            delays: vec![10.0],
            woken_at: woken_at.clone(),
        }))
        .unwrap();

        assert_eq!(sim.run_until(5.0).unwrap(), 1);
        assert_eq!(sim.pending_events(), 1);
        assert_eq!(sim.active_processes(), 1);

        assert_eq!(sim.run_until(20.0).unwrap(), 1);
        assert_eq!(*woken_at.lock(), vec![0.0, 10.0]);
        assert_eq!(sim.active_processes(), 0);
    }

    #[test]
    fn test_event_for_unknown_process_aborts_run() {
        let mut sim = Simulation::new(0);
        sim.context_mut().schedule(1.0, 42, Wake::Timeout).unwrap();

        assert_eq!(sim.run_until(10.0).unwrap_err(), SimError::UnknownProcess(42));
    }

    #[test]
    fn test_event_for_finished_process_aborts_run() {
        let woken_at = Arc::new(Mutex::new(Vec::new()));
        let mut sim = Simulation::new(0);
        let id = sim
            .spawn(Box::new(Sleeper {
                delays: vec![],
                woken_at,
            }))
            .unwrap();
        sim.run_until(1.0).unwrap();
        assert_eq!(sim.active_processes(), 0);

        sim.context_mut().schedule(0.0, id, Wake::Timeout).unwrap();
        assert_eq!(sim.step().unwrap_err(), SimError::UnknownProcess(id));
    }

    #[test]
    fn test_past_event_aborts_run() {
        let woken_at = Arc::new(Mutex::new(Vec::new()));
        let mut sim = Simulation::new(0);
        let id = sim
            .spawn(Box::new(Sleeper {
                delays: vec![5.0, 5.0],
                woken_at,
            }))
            .unwrap();
        sim.run_until(5.0).unwrap();
        assert_eq!(sim.now(), 5.0);

        sim.context_mut()
            .queue_mut()
            .push_unchecked(Event::new(2.0, u64::MAX, id, Wake::Timeout));

        assert_eq!(
            sim.run_until(20.0).unwrap_err(),
            SimError::CausalityViolation {
                now: 5.0,
                event_time: 2.0
            }
        );
    }
}
