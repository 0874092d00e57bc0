//! Vessel lifecycle processes: berthing and unloading.
//!
//! Each arriving vessel gets two independent processes that run side by
//! side and never synchronize: one occupies a berth for the turnaround time,
//! the other empties the vessel one container at a time, first under a
//! crane and then on a truck.

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::Wake;
use crate::observe::TerminalEvent;
use crate::process::{Process, Yield};
use crate::resource::Request;
use crate::types::{PoolId, SimTime, VesselId};

/// Fixed durations of the vessel lifecycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timings {
    /// Time a vessel holds its berth
    pub berth_occupancy: SimTime,
    /// Crane time per container
    pub crane_unload: SimTime,
    /// Truck round trip per container
    pub truck_roundtrip: SimTime,
}

/// A vessel and its remaining cargo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vessel {
    /// Vessel identifier
    pub id: VesselId,
    /// Containers on board at arrival
    pub container_load: u32,
    /// Containers still on board
    remaining: u32,
}

impl Vessel {
    /// Creates a fully loaded vessel.
    pub fn new(id: VesselId, container_load: u32) -> Self {
        Self {
            id,
            container_load,
            remaining: container_load,
        }
    }

    /// Returns the display name, `Vessel-<id>`.
    pub fn name(&self) -> String {
        format!("Vessel-{}", self.id)
    }

    /// Returns the containers still on board.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns the containers taken off so far.
    pub fn unloaded(&self) -> u32 {
        self.container_load - self.remaining
    }

    /// Returns true once every container is off.
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Takes one container off and returns the new unloaded count.
    fn unload_one(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.unloaded()
    }
}

#[derive(Debug)]
enum BerthState {
    Arriving,
    WaitingForBerth,
    Berthed(Request),
    Departed,
}

/// Occupies one berth for the turnaround time, then leaves.
#[derive(Debug)]
pub struct BerthingProcess {
    vessel: VesselId,
    berth: PoolId,
    occupancy: SimTime,
    state: BerthState,
}

impl BerthingProcess {
    /// Creates the berthing process of a vessel.
    ///
    /// # Arguments
    /// * `vessel` - The vessel being berthed
    /// * `berth` - The berth pool
    /// * `occupancy` - How long the berth is held
    pub fn new(vessel: VesselId, berth: PoolId, occupancy: SimTime) -> Self {
        Self {
            vessel,
            berth,
            occupancy,
            state: BerthState::Arriving,
        }
    }
}

impl Process for BerthingProcess {
    fn label(&self) -> String {
        format!("berthing Vessel-{}", self.vessel)
    }

    fn resume(&mut self, ctx: &mut SimContext, wake: Wake) -> SimResult<Yield> {
        match (std::mem::replace(&mut self.state, BerthState::Departed), wake) {
            (BerthState::Arriving, Wake::Start) => {
                self.state = BerthState::WaitingForBerth;
                Ok(Yield::Request(self.berth))
            }
            (BerthState::WaitingForBerth, Wake::Granted(berth)) => {
                ctx.emit(self.vessel, TerminalEvent::VesselBerthed);
                self.state = BerthState::Berthed(berth);
                Ok(Yield::Timeout(self.occupancy))
            }
            (BerthState::Berthed(berth), Wake::Timeout) => {
                ctx.release(&berth)?;
                ctx.emit(self.vessel, TerminalEvent::VesselDeparted);
                Ok(Yield::Done)
            }
            _ => Err(ctx.unexpected_wake()),
        }
    }
}

#[derive(Debug)]
enum UnloadState {
    Starting,
    WaitingForCrane,
    Lifting(Request),
    WaitingForTruck,
    Hauling(Request),
    Finished,
}

/// Empties a vessel container by container.
///
/// Per container the crane is requested, held for the unload delay and
/// released before the truck is requested. The two phases never overlap,
/// which keeps crane holds short but makes the truck pool the usual
/// bottleneck.
#[derive(Debug)]
pub struct UnloadingProcess {
    vessel: Vessel,
    crane: PoolId,
    truck: PoolId,
    timings: Timings,
    state: UnloadState,
}

impl UnloadingProcess {
    /// Creates the unloading process of a vessel.
    ///
    /// # Arguments
    /// * `vessel` - The vessel to unload; the process owns it from now on
    /// * `crane` - The crane pool
    /// * `truck` - The truck pool this vessel was paired with
    /// * `timings` - Crane and truck durations
    pub fn new(vessel: Vessel, crane: PoolId, truck: PoolId, timings: Timings) -> Self {
        Self {
            vessel,
            crane,
            truck,
            timings,
            state: UnloadState::Starting,
        }
    }

    /// Returns the vessel being unloaded.
    pub fn vessel(&self) -> &Vessel {
        &self.vessel
    }

    /// Returns the truck pool this vessel was paired with.
    pub fn truck_pool(&self) -> PoolId {
        self.truck
    }

    fn next_container(&mut self, ctx: &mut SimContext) -> Yield {
        if self.vessel.is_empty() {
            ctx.emit(self.vessel.id, TerminalEvent::UnloadingCompleted);
            self.state = UnloadState::Finished;
            Yield::Done
        } else {
            self.state = UnloadState::WaitingForCrane;
            Yield::Request(self.crane)
        }
    }
}

impl Process for UnloadingProcess {
    fn label(&self) -> String {
        format!("unloading {}", self.vessel.name())
    }

    fn resume(&mut self, ctx: &mut SimContext, wake: Wake) -> SimResult<Yield> {
        match (std::mem::replace(&mut self.state, UnloadState::Finished), wake) {
            (UnloadState::Starting, Wake::Start) => {
                ctx.emit(
                    self.vessel.id,
                    TerminalEvent::UnloadingStarted {
                        truck_pool: self.truck,
                    },
                );
                Ok(self.next_container(ctx))
            }
            (UnloadState::WaitingForCrane, Wake::Granted(crane)) => {
                self.state = UnloadState::Lifting(crane);
                Ok(Yield::Timeout(self.timings.crane_unload))
            }
            (UnloadState::Lifting(crane), Wake::Timeout) => {
                let unloaded = self.vessel.unload_one();
                debug_assert_eq!(self.vessel.remaining(), self.vessel.container_load - unloaded);
                ctx.emit(
                    self.vessel.id,
                    TerminalEvent::ContainerUnloaded {
                        unloaded,
                        remaining: self.vessel.remaining(),
                    },
                );
                ctx.release(&crane)?;
                self.state = UnloadState::WaitingForTruck;
                Ok(Yield::Request(self.truck))
            }
            (UnloadState::WaitingForTruck, Wake::Granted(truck)) => {
                ctx.emit(
                    self.vessel.id,
                    TerminalEvent::TruckAssigned {
                        truck_pool: self.truck,
                    },
                );
                self.state = UnloadState::Hauling(truck);
                Ok(Yield::Timeout(self.timings.truck_roundtrip))
            }
            (UnloadState::Hauling(truck), Wake::Timeout) => {
                ctx.emit(
                    self.vessel.id,
                    TerminalEvent::TruckReturned {
                        truck_pool: self.truck,
                    },
                );
                ctx.release(&truck)?;
                Ok(self.next_container(ctx))
            }
            _ => Err(ctx.unexpected_wake()),
        }
    }
}
