//! Configuration for terminal simulations.
//!
//! This module provides YAML/JSON configuration file support for the
//! terminal parameters fed into the simulation core.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! horizon: 1440
//! seed: 42
//! log_level: info
//! mean_arrival_interval: 300
//! berth_capacity: 2
//! crane_capacity: 2
//! truck_pool_count: 3
//! truck_capacity_per_pool: 1
//! containers_per_vessel: 150
//! berth_occupancy_delay: 0.1
//! crane_unload_delay: 3
//! truck_roundtrip_delay: 6
//! ```
//!
//! Every field is optional and falls back to the reference terminal.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::types::SimTime;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parameters of one terminal simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Simulated minutes to run for
    pub horizon: u64,
    /// Seed of the random source
    pub seed: u64,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Mean time between vessel arrivals
    pub mean_arrival_interval: f64,
    /// Number of berths
    pub berth_capacity: usize,
    /// Number of cranes
    pub crane_capacity: usize,
    /// Number of truck pools a vessel can be paired with
    pub truck_pool_count: usize,
    /// Trucks in each pool
    pub truck_capacity_per_pool: usize,
    /// Containers carried by every arriving vessel
    pub containers_per_vessel: u32,
    /// Time a vessel holds its berth
    pub berth_occupancy_delay: SimTime,
    /// Crane time per container
    pub crane_unload_delay: SimTime,
    /// Truck round trip per container
    pub truck_roundtrip_delay: SimTime,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            horizon: 1440,
            seed: 42,
            log_level: "info".to_string(),
            mean_arrival_interval: 300.0,
            berth_capacity: 2,
            crane_capacity: 2,
            truck_pool_count: 3,
            truck_capacity_per_pool: 1,
            containers_per_vessel: 150,
            berth_occupancy_delay: 0.1,
            crane_unload_delay: 3.0,
            truck_roundtrip_delay: 6.0,
        }
    }
}

impl TerminalConfig {
    /// Creates the reference configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: TerminalConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: TerminalConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.horizon == 0 {
            return Err(ConfigError::Validation("horizon must be positive".to_string()));
        }

        if !(self.mean_arrival_interval.is_finite() && self.mean_arrival_interval > 0.0) {
            return Err(ConfigError::Validation(format!(
                "mean_arrival_interval must be positive, got {}",
                self.mean_arrival_interval
            )));
        }

        let counts = [
            ("berth_capacity", self.berth_capacity),
            ("crane_capacity", self.crane_capacity),
            ("truck_pool_count", self.truck_pool_count),
            ("truck_capacity_per_pool", self.truck_capacity_per_pool),
            ("containers_per_vessel", self.containers_per_vessel as usize),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(ConfigError::Validation(format!("{} must be positive", name)));
            }
        }

        let delays = [
            ("berth_occupancy_delay", self.berth_occupancy_delay),
            ("crane_unload_delay", self.crane_unload_delay),
            ("truck_roundtrip_delay", self.truck_roundtrip_delay),
        ];
        for (name, value) in delays {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating a `TerminalConfig` programmatically.
#[derive(Default)]
pub struct TerminalConfigBuilder {
    config: TerminalConfig,
}

impl TerminalConfigBuilder {
    /// Creates a builder starting from the reference configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the simulation horizon.
    pub fn horizon(mut self, horizon: u64) -> Self {
        self.config.horizon = horizon;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Sets the mean inter-arrival time.
    pub fn mean_arrival_interval(mut self, mean: f64) -> Self {
        self.config.mean_arrival_interval = mean;
        self
    }

    /// Sets the number of berths.
    pub fn berths(mut self, capacity: usize) -> Self {
        self.config.berth_capacity = capacity;
        self
    }

    /// Sets the number of cranes.
    pub fn cranes(mut self, capacity: usize) -> Self {
        self.config.crane_capacity = capacity;
        self
    }

    /// Sets the truck fleet layout.
    pub fn trucks(mut self, pools: usize, per_pool: usize) -> Self {
        self.config.truck_pool_count = pools;
        self.config.truck_capacity_per_pool = per_pool;
        self
    }

    /// Sets the vessel load.
    pub fn containers_per_vessel(mut self, containers: u32) -> Self {
        self.config.containers_per_vessel = containers;
        self
    }

    /// Sets the berth, crane and truck durations.
    pub fn delays(mut self, berth: SimTime, crane: SimTime, truck: SimTime) -> Self {
        self.config.berth_occupancy_delay = berth;
        self.config.crane_unload_delay = crane;
        self.config.truck_roundtrip_delay = truck;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<TerminalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
