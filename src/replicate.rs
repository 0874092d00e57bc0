//! Independent replications of a terminal run.
//!
//! Each replication is a separate [`TerminalModel`] with its own context and
//! seed, so replications share nothing and can run on different threads.
//!
//! # Feature Flag
//!
//! Runs are spread over a thread pool with the `parallel` feature:
//! ```toml
//! [dependencies]
//! berthsim = { version = "0.1", features = ["parallel"] }
//! ```
//! Without it they run one after another.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::TerminalConfig;
use crate::error::Error;
use crate::stats::RunStats;
use crate::terminal::TerminalModel;

/// Runs `config` once per seed and returns the statistics in seed order.
///
/// # Errors
/// The first error of any replication.
pub fn run_replications(config: &TerminalConfig, seeds: &[u64]) -> Result<Vec<RunStats>, Error> {
    tracing::info!(replications = seeds.len(), "running replications");

    #[cfg(feature = "parallel")]
    let iter = seeds.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = seeds.iter();

    iter.map(|&seed| run_one(config, seed)).collect()
}

fn run_one(config: &TerminalConfig, seed: u64) -> Result<RunStats, Error> {
    let config = TerminalConfig {
        seed,
        ..config.clone()
    };
    let mut model = TerminalModel::new(config)?;
    Ok(model.run()?)
}
