//! Statistics collection and export for simulation runs.
//!
//! This module provides per-pool counters, per-run aggregates and export
//! formats (JSON, CSV, human-readable summary) for run analysis.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::observe::TerminalEvent;
use crate::types::SimTime;

/// Counters kept by a single resource pool.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PoolStats {
    /// Pool name
    pub name: String,
    /// Number of slots
    pub capacity: usize,
    /// Requests granted, immediately or after waiting
    pub grants: u64,
    /// Requests granted without waiting
    pub immediate_grants: u64,
    /// Slots released
    pub releases: u64,
    /// Longest waiting queue observed
    pub peak_queue_len: usize,
    /// Highest number of slots held at once
    pub peak_in_use: usize,
    /// Sum of waiting times of all granted requests
    pub total_wait: SimTime,
}

impl PoolStats {
    /// Creates zeroed counters for a pool.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
            ..Self::default()
        }
    }

    pub(crate) fn record_grant(&mut self, waited: SimTime, immediate: bool) {
        self.grants += 1;
        if immediate {
            self.immediate_grants += 1;
        }
        self.total_wait += waited;
    }

    pub(crate) fn observe_queue_len(&mut self, len: usize) {
        self.peak_queue_len = self.peak_queue_len.max(len);
    }

    pub(crate) fn observe_in_use(&mut self, in_use: usize) {
        self.peak_in_use = self.peak_in_use.max(in_use);
    }

    /// Mean waiting time per granted request.
    pub fn mean_wait(&self) -> SimTime {
        if self.grants == 0 {
            0.0
        } else {
            self.total_wait / self.grants as f64
        }
    }
}

/// Counts of emitted terminal events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    pub vessels_arrived: u64,
    pub vessels_berthed: u64,
    pub vessels_departed: u64,
    pub unloading_started: u64,
    pub unloading_completed: u64,
    pub containers_unloaded: u64,
    pub truck_trips_started: u64,
    pub truck_trips_completed: u64,
}

impl EventCounts {
    /// Counts one event.
    pub fn record(&mut self, event: &TerminalEvent) {
        match event {
            TerminalEvent::VesselArrived => self.vessels_arrived += 1,
            TerminalEvent::VesselBerthed => self.vessels_berthed += 1,
            TerminalEvent::VesselDeparted => self.vessels_departed += 1,
            TerminalEvent::UnloadingStarted { .. } => self.unloading_started += 1,
            TerminalEvent::ContainerUnloaded { .. } => self.containers_unloaded += 1,
            TerminalEvent::TruckAssigned { .. } => self.truck_trips_started += 1,
            TerminalEvent::TruckReturned { .. } => self.truck_trips_completed += 1,
            TerminalEvent::UnloadingCompleted => self.unloading_completed += 1,
        }
    }
}

/// Aggregate statistics for a simulation run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Seed of the random source, if known
    pub seed: Option<u64>,
    /// Horizon the run was driven to
    pub horizon: Option<SimTime>,
    /// Simulation time of the last processed event
    pub final_time: SimTime,
    /// Events consumed
    pub events_processed: u64,
    /// Events left in the queue
    pub events_pending: usize,
    /// Largest number of pending events
    pub peak_queue_size: usize,
    /// Process resumptions, including inline grants
    pub resumptions: u64,
    /// Processes spawned
    pub processes_spawned: u64,
    /// Processes that ran to completion
    pub processes_finished: u64,
    /// Counts of observable events
    pub counts: EventCounts,
    /// Per-pool counters in pool order
    pub pools: Vec<PoolStats>,
    /// Wall-clock duration of the run in milliseconds
    pub wall_time_ms: f64,
}

impl RunStats {
    /// Exports statistics to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports statistics to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Exports the statistics of several runs to a JSON file as one array.
    pub fn batch_to_json_file<P: AsRef<Path>>(runs: &[RunStats], path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(runs)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Exports summary statistics to CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("metric,value\n");

        csv.push_str(&format!("final_time,{}\n", self.final_time));
        csv.push_str(&format!("events_processed,{}\n", self.events_processed));
        csv.push_str(&format!("events_pending,{}\n", self.events_pending));
        csv.push_str(&format!("resumptions,{}\n", self.resumptions));
        csv.push_str(&format!("processes_spawned,{}\n", self.processes_spawned));
        csv.push_str(&format!("processes_finished,{}\n", self.processes_finished));
        csv.push_str(&format!("vessels_arrived,{}\n", self.counts.vessels_arrived));
        csv.push_str(&format!("vessels_berthed,{}\n", self.counts.vessels_berthed));
        csv.push_str(&format!("unloading_completed,{}\n", self.counts.unloading_completed));
        csv.push_str(&format!("containers_unloaded,{}\n", self.counts.containers_unloaded));
        for pool in &self.pools {
            csv.push_str(&format!("{}.grants,{}\n", pool.name, pool.grants));
            csv.push_str(&format!("{}.mean_wait,{:.3}\n", pool.name, pool.mean_wait()));
        }
        csv.push_str(&format!("wall_time_ms,{:.2}\n", self.wall_time_ms));

        csv
    }

    /// Writes a human-readable summary to a writer.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Terminal Simulation ===")?;
        if let Some(seed) = self.seed {
            writeln!(w, "Seed: {}", seed)?;
        }
        if let Some(horizon) = self.horizon {
            writeln!(w, "Horizon: {}", horizon)?;
        }
        writeln!(w)?;

        writeln!(w, "--- Scheduler ---")?;
        writeln!(w, "Final simulation time: {:.3}", self.final_time)?;
        writeln!(w, "Events processed: {}", self.events_processed)?;
        writeln!(w, "Events pending: {}", self.events_pending)?;
        writeln!(w, "Processes: {} spawned, {} finished", self.processes_spawned, self.processes_finished)?;
        writeln!(w, "Wall time: {:.2} ms", self.wall_time_ms)?;
        writeln!(w)?;

        writeln!(w, "--- Vessels ---")?;
        writeln!(w, "Arrived: {}", self.counts.vessels_arrived)?;
        writeln!(w, "Berthed: {}", self.counts.vessels_berthed)?;
        writeln!(w, "Fully unloaded: {}", self.counts.unloading_completed)?;
        writeln!(w, "Containers unloaded: {}", self.counts.containers_unloaded)?;
        writeln!(w)?;

        writeln!(w, "--- Pools ---")?;
        for pool in &self.pools {
            writeln!(w, "{} (capacity {}):", pool.name, pool.capacity)?;
            writeln!(w, "  Grants: {} ({} immediate)", pool.grants, pool.immediate_grants)?;
            writeln!(w, "  Peak queue: {}, peak in use: {}", pool.peak_queue_len, pool.peak_in_use)?;
            writeln!(w, "  Mean wait: {:.3}", pool.mean_wait())?;
        }

        Ok(())
    }

    /// Returns a summary string.
    pub fn summary(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_summary(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// A simple timer for measuring wall-clock time.
#[derive(Debug)]
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Starts a new timer.
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Returns elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}
