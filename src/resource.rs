//! Capacity-bounded resource pools with FIFO waiting queues.
//!
//! A pool holds `capacity` interchangeable slots. Requests are granted in the
//! order they were issued: a request is granted on the spot only when a slot
//! is free and nobody is already waiting, otherwise it joins the tail of the
//! waiting queue. Releasing a slot hands it straight to the head of the queue.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::stats::PoolStats;
use crate::types::{PoolId, ProcessId, RequestId, SimTime};

/// Lifecycle state of a [`Request`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// Waiting in the pool's queue
    Pending,
    /// Holding one of the pool's slots
    Granted,
}

/// Handle for a slot requested from a [`ResourcePool`].
///
/// The handle records which pool it belongs to and which process issued it.
/// The issuing process releases it exactly once after its protected work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unique request identifier
    pub id: RequestId,
    /// The pool this request was issued against
    pub pool: PoolId,
    /// The process that issued the request
    pub owner: ProcessId,
    /// Current state
    pub state: RequestState,
    /// Simulation time at which the request was issued
    pub issued_at: SimTime,
}

impl Request {
    /// Returns true if the request currently holds a slot.
    pub fn is_granted(&self) -> bool {
        self.state == RequestState::Granted
    }
}

/// A pool of interchangeable slots with a FIFO waiting queue.
///
/// # Example
///
/// ```rust
/// use berthsim::resource::ResourcePool;
///
/// let mut berths = ResourcePool::new(0, "berth", 1);
/// let first = berths.request(1, 10, 0.0);
/// let second = berths.request(2, 11, 0.0);
/// assert!(first.is_granted());
/// assert!(!second.is_granted());
///
/// let handed_over = berths.release(&first, 0.1).unwrap().unwrap();
/// assert_eq!(handed_over.id, second.id);
/// assert_eq!(berths.in_use(), 1);
/// ```
#[derive(Debug)]
pub struct ResourcePool {
    /// Pool identifier
    id: PoolId,
    /// Human-readable name, used in logs and statistics
    name: String,
    /// Fixed number of slots
    capacity: usize,
    /// Requests currently holding a slot
    granted: HashSet<RequestId>,
    /// Pending requests in arrival order
    waiting: VecDeque<Request>,
    /// Counters
    stats: PoolStats,
}

impl ResourcePool {
    /// Creates a new pool.
    ///
    /// # Arguments
    /// * `id` - The pool identifier
    /// * `name` - Name used in logs and statistics
    /// * `capacity` - Number of slots
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(id: PoolId, name: impl Into<String>, capacity: usize) -> Self {
        assert!(capacity > 0, "resource pool capacity must be positive");
        let name = name.into();
        Self {
            id,
            stats: PoolStats::new(name.clone(), capacity),
            name,
            capacity,
            granted: HashSet::new(),
            waiting: VecDeque::new(),
        }
    }

    /// Returns the pool identifier.
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Returns the pool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.granted.len()
    }

    /// Returns the number of pending requests.
    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    /// Returns the pending requests, head first.
    pub fn waiting(&self) -> impl Iterator<Item = &Request> {
        self.waiting.iter()
    }

    /// Returns the pool counters.
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Issues a request for one slot.
    ///
    /// The returned handle is granted when a slot is free and the waiting
    /// queue is empty; otherwise it is pending at the tail of the queue.
    ///
    /// # Arguments
    /// * `id` - Identifier for the new request
    /// * `owner` - The requesting process
    /// * `now` - Current simulation time
    pub fn request(&mut self, id: RequestId, owner: ProcessId, now: SimTime) -> Request {
        let mut request = Request {
            id,
            pool: self.id,
            owner,
            state: RequestState::Pending,
            issued_at: now,
        };

        if self.waiting.is_empty() && self.in_use() < self.capacity {
            request.state = RequestState::Granted;
            self.granted.insert(id);
            self.stats.record_grant(0.0, true);
            self.stats.observe_in_use(self.in_use());
            tracing::debug!(pool = %self.name, request = id, owner, "granted immediately");
        } else {
            self.waiting.push_back(request.clone());
            self.stats.observe_queue_len(self.waiting.len());
            tracing::debug!(
                pool = %self.name,
                request = id,
                owner,
                queue_len = self.waiting.len(),
                "queued"
            );
        }

        request
    }

    /// Releases a granted request.
    ///
    /// If requests are waiting, the freed slot goes to the head of the queue
    /// and that request is returned in the granted state. The caller is
    /// responsible for waking its owner.
    ///
    /// # Errors
    /// Returns [`SimError::DoubleRelease`] if `request` does not currently
    /// hold a slot of this pool.
    pub fn release(&mut self, request: &Request, now: SimTime) -> SimResult<Option<Request>> {
        if request.pool != self.id || !self.granted.remove(&request.id) {
            return Err(SimError::DoubleRelease {
                pool: self.id,
                request: request.id,
            });
        }
        self.stats.releases += 1;

        let Some(mut next) = self.waiting.pop_front() else {
            return Ok(None);
        };
        next.state = RequestState::Granted;
        self.granted.insert(next.id);
        self.stats.record_grant(now - next.issued_at, false);
        self.stats.observe_in_use(self.in_use());
        tracing::debug!(
            pool = %self.name,
            released = request.id,
            granted = next.id,
            owner = next.owner,
            "slot handed over"
        );

        debug_assert!(self.in_use() <= self.capacity);
        Ok(Some(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_grant_until_full() {
        let mut pool = ResourcePool::new(0, "crane", 2);
        let a = pool.request(1, 1, 0.0);
        let b = pool.request(2, 2, 0.0);
        let c = pool.request(3, 3, 0.0);

        assert!(a.is_granted());
        assert!(b.is_granted());
        assert_eq!(c.state, RequestState::Pending);
        assert_eq!(pool.in_use(), 2);
        assert_eq!(pool.queue_len(), 1);
    }

    #[test]
    fn test_release_without_waiters_frees_slot() {
        let mut pool = ResourcePool::new(0, "berth", 1);
        let a = pool.request(1, 1, 0.0);

        assert_eq!(pool.release(&a, 1.0).unwrap(), None);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_fifo_handover() {
        let mut pool = ResourcePool::new(0, "truck", 1);
        let holder = pool.request(1, 1, 0.0);
        let r1 = pool.request(2, 2, 0.0);
        let r2 = pool.request(3, 3, 1.0);
        let r3 = pool.request(4, 4, 2.0);

        let g1 = pool.release(&holder, 5.0).unwrap().unwrap();
        assert_eq!(g1.id, r1.id);
        assert!(g1.is_granted());

        let g2 = pool.release(&g1, 6.0).unwrap().unwrap();
        assert_eq!(g2.id, r2.id);

        let g3 = pool.release(&g2, 7.0).unwrap().unwrap();
        assert_eq!(g3.id, r3.id);

        assert_eq!(pool.release(&g3, 8.0).unwrap(), None);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_queued_request_blocks_later_grants() {
        let mut pool = ResourcePool::new(0, "berth", 1);
        let holder = pool.request(1, 1, 0.0);
        let waiting = pool.request(2, 2, 0.0);

        // The freed slot goes to the waiter, not to a newcomer.
        let granted = pool.release(&holder, 1.0).unwrap().unwrap();
        assert_eq!(granted.id, waiting.id);
        let newcomer = pool.request(3, 3, 1.0);
        assert!(!newcomer.is_granted());
    }

    #[test]
    fn test_double_release() {
        let mut pool = ResourcePool::new(4, "berth", 1);
        let a = pool.request(1, 1, 0.0);
        pool.release(&a, 1.0).unwrap();

        assert_eq!(
            pool.release(&a, 2.0).unwrap_err(),
            SimError::DoubleRelease { pool: 4, request: 1 }
        );
    }

    #[test]
    fn test_release_pending_request_fails() {
        let mut pool = ResourcePool::new(0, "berth", 1);
        let _holder = pool.request(1, 1, 0.0);
        let pending = pool.request(2, 2, 0.0);

        assert!(matches!(
            pool.release(&pending, 1.0),
            Err(SimError::DoubleRelease { request: 2, .. })
        ));
        assert_eq!(pool.queue_len(), 1);
    }

    #[test]
    fn test_release_on_wrong_pool_fails() {
        let mut cranes = ResourcePool::new(0, "crane", 1);
        let mut trucks = ResourcePool::new(1, "truck", 1);
        let crane = cranes.request(1, 1, 0.0);
        let _truck = trucks.request(2, 1, 0.0);

        assert!(trucks.release(&crane, 1.0).is_err());
        assert_eq!(trucks.in_use(), 1);
    }

    #[test]
    fn test_pool_stats() {
        let mut pool = ResourcePool::new(0, "crane", 1);
        let a = pool.request(1, 1, 0.0);
        let _b = pool.request(2, 2, 1.0);
        pool.release(&a, 4.0).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.grants, 2);
        assert_eq!(stats.immediate_grants, 1);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.peak_queue_len, 1);
        assert_eq!(stats.peak_in_use, 1);
        assert_eq!(stats.total_wait, 3.0);
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn test_zero_capacity_panics() {
        let _ = ResourcePool::new(0, "empty", 0);
    }
}
