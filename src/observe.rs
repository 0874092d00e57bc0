//! Observable terminal events and the observers that consume them.
//!
//! Processes publish what happens to a vessel through
//! [`SimContext::emit`](crate::SimContext::emit). The core never formats text;
//! observers decide what to do with each [`Observation`].

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::types::{PoolId, SimTime, VesselId};

/// Something that happened to a vessel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalEvent {
    /// The vessel entered the simulation.
    VesselArrived,
    /// The vessel was granted a berth.
    VesselBerthed,
    /// The vessel released its berth.
    VesselDeparted,
    /// The unloading process started, paired with a truck pool.
    UnloadingStarted { truck_pool: PoolId },
    /// A crane finished lifting one container.
    ContainerUnloaded { unloaded: u32, remaining: u32 },
    /// A truck was assigned to haul the last unloaded container.
    TruckAssigned { truck_pool: PoolId },
    /// The truck came back from its round trip.
    TruckReturned { truck_pool: PoolId },
    /// Every container of the vessel has been unloaded.
    UnloadingCompleted,
}

/// A [`TerminalEvent`] stamped with its vessel and simulation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Simulation time at which the event occurred
    pub time: SimTime,
    /// The vessel concerned
    pub vessel: VesselId,
    /// What happened
    pub event: TerminalEvent,
}

impl Observation {
    /// Creates a new observation.
    pub fn new(time: SimTime, vessel: VesselId, event: TerminalEvent) -> Self {
        Self { time, vessel, event }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vessel = format!("Vessel-{}", self.vessel);
        match &self.event {
            TerminalEvent::VesselArrived => write!(f, "{}: {} arrived", self.time, vessel),
            TerminalEvent::VesselBerthed => write!(f, "{}: {} berthed", self.time, vessel),
            TerminalEvent::VesselDeparted => write!(f, "{}: {} left its berth", self.time, vessel),
            TerminalEvent::UnloadingStarted { truck_pool } => write!(
                f,
                "{}: Unloading started for {} (truck pool {})",
                self.time, vessel, truck_pool
            ),
            TerminalEvent::ContainerUnloaded { unloaded, .. } => write!(
                f,
                "{}: {} container unloaded from {}",
                self.time, unloaded, vessel
            ),
            TerminalEvent::TruckAssigned { .. } => {
                write!(f, "{}: Container assigned to truck", self.time)
            }
            TerminalEvent::TruckReturned { .. } => write!(f, "{}: Truck returned", self.time),
            TerminalEvent::UnloadingCompleted => {
                write!(f, "{}: Unloading completed for {}", self.time, vessel)
            }
        }
    }
}

/// Consumer of observations.
///
/// Any `FnMut(&Observation) + Send` closure is an observer.
pub trait Observer: Send {
    /// Called once per observation, in emission order.
    fn observe(&mut self, observation: &Observation);
}

impl<F> Observer for F
where
    F: FnMut(&Observation) + Send,
{
    fn observe(&mut self, observation: &Observation) {
        self(observation)
    }
}

/// An in-memory log of observations.
///
/// Clones share the same storage, so one clone can be registered with a
/// simulation while another is kept to read the log afterwards.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    records: Arc<Mutex<Vec<Observation>>>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every observation recorded so far.
    pub fn records(&self) -> Vec<Observation> {
        self.records.lock().clone()
    }

    /// Returns the observations concerning one vessel.
    pub fn for_vessel(&self, vessel: VesselId) -> Vec<Observation> {
        self.records
            .lock()
            .iter()
            .filter(|o| o.vessel == vessel)
            .cloned()
            .collect()
    }

    /// Returns the number of observations recorded.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Serializes the log as JSON lines.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in self.records.lock().iter() {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl Observer for EventLog {
    fn observe(&mut self, observation: &Observation) {
        self.records.lock().push(observation.clone());
    }
}

/// Forwards every observation to `tracing` at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&mut self, observation: &Observation) {
        tracing::info!(
            time = observation.time,
            vessel = observation.vessel,
            event = ?observation.event,
            "{}",
            observation
        );
    }
}
