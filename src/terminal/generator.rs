//! The arrival generator: the one long-lived process that brings vessels in.

use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::config::{ConfigError, ConfigResult};
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::Wake;
use crate::observe::TerminalEvent;
use crate::process::{Process, Yield};
use crate::terminal::vessel::{BerthingProcess, Timings, UnloadingProcess, Vessel};
use crate::types::{PoolId, VesselId};

/// Identifiers of the pools a terminal is made of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalPools {
    /// Berth pool
    pub berth: PoolId,
    /// Crane pool
    pub crane: PoolId,
    /// Truck pools, one of which is paired with each vessel
    trucks: Vec<PoolId>,
}

impl TerminalPools {
    /// Groups the pool identifiers of a terminal.
    ///
    /// # Panics
    /// Panics if `trucks` is empty.
    pub fn new(berth: PoolId, crane: PoolId, trucks: Vec<PoolId>) -> Self {
        assert!(!trucks.is_empty(), "a terminal needs at least one truck pool");
        Self { berth, crane, trucks }
    }

    /// Returns the truck pools.
    pub fn trucks(&self) -> &[PoolId] {
        &self.trucks
    }

    /// Picks a truck pool uniformly at random.
    pub fn pick_truck<R: Rng + ?Sized>(&self, rng: &mut R) -> PoolId {
        self.trucks[rng.gen_range(0..self.trucks.len())]
    }
}

/// Spawns a vessel, waits an exponentially distributed time, repeats.
///
/// The generator never finishes on its own; the run's horizon stops it.
#[derive(Debug)]
pub struct ArrivalGenerator {
    pools: TerminalPools,
    timings: Timings,
    containers_per_vessel: u32,
    interarrival: Exp<f64>,
    next_vessel: VesselId,
}

impl ArrivalGenerator {
    /// Creates a generator.
    ///
    /// # Arguments
    /// * `pools` - The terminal's pools
    /// * `timings` - Durations handed to every vessel process
    /// * `containers_per_vessel` - Load of each arriving vessel
    /// * `mean_interval` - Mean time between arrivals
    ///
    /// # Errors
    /// [`ConfigError::Validation`] if `mean_interval` is not positive.
    pub fn new(
        pools: TerminalPools,
        timings: Timings,
        containers_per_vessel: u32,
        mean_interval: f64,
    ) -> ConfigResult<Self> {
        if mean_interval.is_nan() || mean_interval <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "mean arrival interval must be positive, got {}",
                mean_interval
            )));
        }
        let interarrival =
            Exp::new(1.0 / mean_interval).map_err(|e| ConfigError::Validation(e.to_string()))?;

        Ok(Self {
            pools,
            timings,
            containers_per_vessel,
            interarrival,
            next_vessel: 1,
        })
    }

    /// Returns the number of vessels spawned so far.
    pub fn vessels_spawned(&self) -> u64 {
        self.next_vessel - 1
    }
}

impl Process for ArrivalGenerator {
    fn label(&self) -> String {
        "arrival generator".to_string()
    }

    fn resume(&mut self, ctx: &mut SimContext, wake: Wake) -> SimResult<Yield> {
        if matches!(wake, Wake::Granted(_)) {
            return Err(ctx.unexpected_wake());
        }

        let id = self.next_vessel;
        self.next_vessel += 1;
        ctx.emit(id, TerminalEvent::VesselArrived);

        ctx.spawn(Box::new(BerthingProcess::new(
            id,
            self.pools.berth,
            self.timings.berth_occupancy,
        )))?;

        let truck = self.pools.pick_truck(ctx.rng());
        ctx.spawn(Box::new(UnloadingProcess::new(
            Vessel::new(id, self.containers_per_vessel),
            self.pools.crane,
            truck,
            self.timings,
        )))?;

        let wait = self.interarrival.sample(ctx.rng());
        tracing::debug!(vessel = id, truck, next_arrival_in = wait, "vessel arrived");
        Ok(Yield::Timeout(wait))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Simulation;
    use crate::observe::EventLog;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const TIMINGS: Timings = Timings {
        berth_occupancy: 0.1,
        crane_unload: 3.0,
        truck_roundtrip: 6.0,
    };

    fn terminal(sim: &mut Simulation) -> TerminalPools {
        let berth = sim.add_pool("berth", 2);
        let crane = sim.add_pool("crane", 2);
        let trucks = (1..=3).map(|i| sim.add_pool(format!("truck-{}", i), 1)).collect();
        TerminalPools::new(berth, crane, trucks)
    }

    #[test]
    fn test_pick_truck_covers_all_pools() {
        let pools = TerminalPools::new(0, 1, vec![2, 3, 4]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let truck = pools.pick_truck(&mut rng);
            seen[truck - 2] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    #[should_panic(expected = "at least one truck pool")]
    fn test_no_truck_pools_panics() {
        let _ = TerminalPools::new(0, 1, Vec::new());
    }

    #[test]
    fn test_rejects_non_positive_mean() {
        let pools = TerminalPools::new(0, 1, vec![2]);
        assert!(ArrivalGenerator::new(pools.clone(), TIMINGS, 10, 0.0).is_err());
        assert!(ArrivalGenerator::new(pools, TIMINGS, 10, -5.0).is_err());
    }

    #[test]
    fn test_first_vessel_arrives_at_time_zero() {
        let mut sim = Simulation::new(1);
        let log = EventLog::new();
        sim.add_observer(Box::new(log.clone()));
        let pools = terminal(&mut sim);

        let generator = ArrivalGenerator::new(pools, TIMINGS, 5, 300.0).unwrap();
        sim.spawn(Box::new(generator)).unwrap();
        sim.run_until(0.0).unwrap();

        let records = log.records();
        assert_eq!(records[0].event, TerminalEvent::VesselArrived);
        assert_eq!(records[0].vessel, 1);
        assert_eq!(records[1].event, TerminalEvent::VesselBerthed);
        assert!(matches!(records[2].event, TerminalEvent::UnloadingStarted { .. }));
        // generator, berthing, unloading
        assert_eq!(sim.context().spawned_count(), 3);
    }

    #[test]
    fn test_arrivals_keep_coming() {
        let mut sim = Simulation::new(9);
        let log = EventLog::new();
        sim.add_observer(Box::new(log.clone()));
        let pools = terminal(&mut sim);

        let generator = ArrivalGenerator::new(pools, TIMINGS, 1, 10.0).unwrap();
        sim.spawn(Box::new(generator)).unwrap();
        sim.run_until(1000.0).unwrap();

        let arrivals: Vec<_> = log
            .records()
            .into_iter()
            .filter(|o| o.event == TerminalEvent::VesselArrived)
            .collect();
        assert!(arrivals.len() > 10);
        assert!(arrivals.windows(2).all(|w| w[0].time <= w[1].time));
        assert!(arrivals.iter().enumerate().all(|(i, o)| o.vessel == i as u64 + 1));
        // The generator is still waiting for its next arrival.
        assert!(sim.active_processes() >= 1);
    }
}
