//! The simulation context: everything a process may touch while it runs.
//!
//! The context owns the clock and event queue, the resource pools, the seeded
//! random source and the registered observers. It is passed explicitly to
//! every process, so independent simulations can live side by side in one
//! program.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{SimError, SimResult};
use crate::event::{Event, Wake};
use crate::executor::queue::EventQueue;
use crate::observe::{Observation, Observer, TerminalEvent};
use crate::process::Process;
use crate::resource::{Request, ResourcePool};
use crate::stats::EventCounts;
use crate::types::{PoolId, ProcessId, RequestId, SimTime, VesselId};

/// The random source used by simulations.
pub type SimRng = ChaCha8Rng;

/// Shared state of one simulation run.
pub struct SimContext {
    /// Clock and pending events
    queue: EventQueue,
    /// Resource pools indexed by `PoolId`
    pools: Vec<ResourcePool>,
    /// Seeded random source
    rng: SimRng,
    /// Registered observers, notified in registration order
    observers: Vec<Box<dyn Observer>>,
    /// Processes spawned during the current resumption, not yet adopted
    spawned: Vec<(ProcessId, Box<dyn Process>)>,
    /// The process currently being resumed
    current: Option<ProcessId>,
    /// Identifier for the next spawned process
    next_process: ProcessId,
    /// Identifier for the next request
    next_request: RequestId,
    /// Counts of emitted observations
    counts: EventCounts,
}

impl SimContext {
    /// Creates a context whose random source is seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_rng(SimRng::seed_from_u64(seed))
    }

    /// Creates a context with an explicit random source.
    pub fn with_rng(rng: SimRng) -> Self {
        Self {
            queue: EventQueue::new(),
            pools: Vec::new(),
            rng,
            observers: Vec::new(),
            spawned: Vec::new(),
            current: None,
            next_process: 1,
            next_request: 1,
            counts: EventCounts::default(),
        }
    }

    /// Returns the current simulation time.
    pub fn now(&self) -> SimTime {
        self.queue.now()
    }

    /// Returns the random source.
    pub fn rng(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    /// Returns the event queue.
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Returns the process currently being resumed, if any.
    pub fn current_process(&self) -> Option<ProcessId> {
        self.current
    }

    /// Builds the error a process returns when resumed out of protocol.
    pub fn unexpected_wake(&self) -> SimError {
        SimError::UnexpectedWake(self.current.unwrap_or_default())
    }

    /// Adds a resource pool and returns its identifier.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn add_pool(&mut self, name: impl Into<String>, capacity: usize) -> PoolId {
        let id = self.pools.len();
        self.pools.push(ResourcePool::new(id, name, capacity));
        id
    }

    /// Returns a pool by identifier.
    pub fn pool(&self, id: PoolId) -> Option<&ResourcePool> {
        self.pools.get(id)
    }

    /// Returns all pools in identifier order.
    pub fn pools(&self) -> &[ResourcePool] {
        &self.pools
    }

    /// Registers an observer.
    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Publishes a terminal event, stamped with the current time, to every observer.
    pub fn emit(&mut self, vessel: VesselId, event: TerminalEvent) {
        let observation = Observation::new(self.now(), vessel, event);
        self.counts.record(&observation.event);
        for observer in &mut self.observers {
            observer.observe(&observation);
        }
    }

    /// Returns counts of the observations emitted so far.
    pub fn counts(&self) -> &EventCounts {
        &self.counts
    }

    /// Spawns a process. It is started by a zero-delay event, after every
    /// event already scheduled for the current instant.
    pub fn spawn(&mut self, process: Box<dyn Process>) -> SimResult<ProcessId> {
        let id = self.next_process;
        self.next_process += 1;
        self.queue.schedule(0.0, id, Wake::Start)?;
        tracing::debug!(process = id, label = %process.label(), time = self.now(), "spawned");
        self.spawned.push((id, process));
        Ok(id)
    }

    /// Returns the number of processes spawned so far.
    pub fn spawned_count(&self) -> u64 {
        self.next_process - 1
    }

    /// Releases a granted request.
    ///
    /// If another process was waiting on the pool, it is granted the slot and
    /// woken by a zero-delay event.
    ///
    /// # Errors
    /// [`SimError::UnknownPool`] if the request names a missing pool,
    /// [`SimError::DoubleRelease`] if it is not currently granted.
    pub fn release(&mut self, request: &Request) -> SimResult<()> {
        let now = self.now();
        let pool = self
            .pools
            .get_mut(request.pool)
            .ok_or(SimError::UnknownPool(request.pool))?;

        if let Some(next) = pool.release(request, now)? {
            let owner = next.owner;
            self.queue.schedule(0.0, owner, Wake::Granted(next))?;
        }
        Ok(())
    }

    /// Issues a request on behalf of `owner`.
    pub(crate) fn request(&mut self, pool: PoolId, owner: ProcessId) -> SimResult<Request> {
        let now = self.now();
        let id = self.next_request;
        let pool = self.pools.get_mut(pool).ok_or(SimError::UnknownPool(pool))?;
        self.next_request += 1;
        Ok(pool.request(id, owner, now))
    }

    pub(crate) fn schedule(&mut self, delay: SimTime, target: ProcessId, wake: Wake) -> SimResult<Event> {
        self.queue.schedule(delay, target, wake)
    }

    pub(crate) fn pop_due(&mut self, horizon: SimTime) -> SimResult<Option<Event>> {
        self.queue.pop_due(horizon)
    }

    pub(crate) fn set_current(&mut self, process: Option<ProcessId>) {
        self.current = process;
    }

    pub(crate) fn take_spawned(&mut self) -> Vec<(ProcessId, Box<dyn Process>)> {
        std::mem::take(&mut self.spawned)
    }

    #[cfg(test)]
    pub(crate) fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }
}
