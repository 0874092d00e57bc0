//! The container terminal model built on top of the simulation core.
//!
//! A [`TerminalModel`] turns a [`TerminalConfig`] into a ready-to-run
//! [`Simulation`]: one berth pool, one crane pool, a fleet of truck pools and
//! the [`ArrivalGenerator`] that feeds vessels into them.

pub mod generator;
pub mod vessel;

pub use generator::{ArrivalGenerator, TerminalPools};
pub use vessel::{BerthingProcess, Timings, UnloadingProcess, Vessel};

use crate::config::TerminalConfig;
use crate::error::{Error, SimResult};
use crate::executor::Simulation;
use crate::observe::Observer;
use crate::stats::{RunStats, Timer};
use crate::types::SimTime;

/// A configured terminal, ready to run.
///
/// # Example
///
/// ```rust
/// use berthsim::{EventLog, TerminalConfigBuilder, TerminalModel};
///
/// let config = TerminalConfigBuilder::new()
///     .horizon(600)
///     .seed(7)
///     .containers_per_vessel(10)
///     .build()
///     .unwrap();
///
/// let log = EventLog::new();
/// let mut model = TerminalModel::new(config).unwrap();
/// model.add_observer(Box::new(log.clone()));
///
/// let stats = model.run().unwrap();
/// assert!(stats.counts.vessels_arrived >= 1);
/// assert!(!log.is_empty());
/// ```
pub struct TerminalModel {
    config: TerminalConfig,
    sim: Simulation,
    pools: TerminalPools,
    wall_time_ms: f64,
}

impl TerminalModel {
    /// Builds the pools and schedules the arrival generator.
    ///
    /// # Errors
    /// [`Error::Config`] if the configuration does not validate.
    pub fn new(config: TerminalConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut sim = Simulation::new(config.seed);
        let berth = sim.add_pool("berth", config.berth_capacity);
        let crane = sim.add_pool("crane", config.crane_capacity);
        let trucks = (1..=config.truck_pool_count)
            .map(|i| sim.add_pool(format!("truck-{}", i), config.truck_capacity_per_pool))
            .collect();
        let pools = TerminalPools::new(berth, crane, trucks);

        let generator = ArrivalGenerator::new(
            pools.clone(),
            Timings {
                berth_occupancy: config.berth_occupancy_delay,
                crane_unload: config.crane_unload_delay,
                truck_roundtrip: config.truck_roundtrip_delay,
            },
            config.containers_per_vessel,
            config.mean_arrival_interval,
        )?;
        sim.spawn(Box::new(generator))?;

        Ok(Self {
            config,
            sim,
            pools,
            wall_time_ms: 0.0,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Returns the pool identifiers.
    pub fn pools(&self) -> &TerminalPools {
        &self.pools
    }

    /// Returns the underlying simulation.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Registers an observer.
    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.sim.add_observer(observer);
    }

    /// Runs up to the configured horizon and returns the run statistics.
    pub fn run(&mut self) -> SimResult<RunStats> {
        let horizon = self.config.horizon as SimTime;
        tracing::info!(horizon, seed = self.config.seed, "terminal simulation started");

        self.run_until(horizon)?;

        let stats = self.stats();
        tracing::info!(
            final_time = stats.final_time,
            vessels = stats.counts.vessels_arrived,
            containers = stats.counts.containers_unloaded,
            "terminal simulation finished"
        );
        Ok(stats)
    }

    /// Runs up to an explicit horizon. Returns the number of events consumed.
    pub fn run_until(&mut self, horizon: SimTime) -> SimResult<u64> {
        let timer = Timer::start();
        let consumed = self.sim.run_until(horizon);
        self.wall_time_ms += timer.elapsed_ms();
        consumed
    }

    /// Collects the statistics of the run so far.
    pub fn stats(&self) -> RunStats {
        RunStats {
            seed: Some(self.config.seed),
            horizon: Some(self.config.horizon as SimTime),
            wall_time_ms: self.wall_time_ms,
            ..self.sim.stats()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_model_layout() {
        let model = TerminalModel::new(TerminalConfig::default()).unwrap();
        let ctx = model.simulation().context();

        assert_eq!(ctx.pools().len(), 5);
        assert_eq!(ctx.pool(model.pools().berth).unwrap().name(), "berth");
        assert_eq!(ctx.pool(model.pools().crane).unwrap().capacity(), 2);
        assert_eq!(model.pools().trucks().len(), 3);
        assert_eq!(model.simulation().pending_events(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TerminalConfig {
            berth_capacity: 0,
            ..TerminalConfig::default()
        };
        assert!(matches!(
            TerminalModel::new(config),
            Err(Error::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let config = TerminalConfig {
            horizon: 0,
            ..TerminalConfig::default()
        };
        assert!(matches!(
            TerminalModel::new(config),
            Err(Error::Config(ConfigError::Validation(_)))
        ));
    }
}
