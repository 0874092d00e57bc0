//! Command-line front end for the terminal simulation.
//!
//! ```text
//! berthsim --horizon 1440 --seed 42
//! berthsim --config terminal.yaml --stats-json stats.json
//! berthsim                      # prompts for the horizon
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use berthsim::{run_replications, Error, RunStats, TerminalConfig, TerminalModel, TracingObserver};

#[derive(Parser, Debug)]
#[command(name = "berthsim", version, about = "Container terminal discrete-event simulation")]
struct Cli {
    /// Simulated minutes to run; prompted for when neither this nor --config is given
    #[arg(long)]
    horizon: Option<u64>,

    /// YAML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed of the random source
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Write run statistics as JSON to this file
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Run this many replications with consecutive seeds instead of one traced run
    #[arg(long)]
    replications: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match TerminalConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => TerminalConfig::default(),
    };

    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    } else if cli.config.is_none() {
        match prompt_horizon(io::stdin().lock(), io::stdout()) {
            Some(horizon) => config.horizon = horizon,
            None => {
                println!("The input could not be parsed. Please provide an integer value.");
                return ExitCode::FAILURE;
            }
        }
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    berthsim::init_logging(&config.log_level);

    match run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            eprintln!("Simulation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: TerminalConfig) -> Result<(), Error> {
    if let Some(count) = cli.replications {
        let seeds: Vec<u64> = (0..count).map(|i| config.seed.wrapping_add(i)).collect();
        let runs = run_replications(&config, &seeds)?;
        for stats in &runs {
            println!("{}", stats.summary());
        }
        if let Some(path) = &cli.stats_json {
            RunStats::batch_to_json_file(&runs, path)?;
        }
        return Ok(());
    }

    let mut model = TerminalModel::new(config)?;
    model.add_observer(Box::new(TracingObserver));
    let stats = model.run()?;
    println!("{}", stats.summary());

    if let Some(path) = &cli.stats_json {
        stats.to_json_file(path)?;
        tracing::info!(path = %path.display(), "statistics written");
    }
    Ok(())
}

/// Asks for the horizon in whole minutes. Returns `None` unless the answer
/// is a positive integer written in digits.
fn prompt_horizon<R: BufRead, W: Write>(mut input: R, mut output: W) -> Option<u64> {
    write!(output, "Provide the simulation time in minutes: ").ok()?;
    output.flush().ok()?;

    let mut line = String::new();
    input.read_line(&mut line).ok()?;
    let answer = line.trim();
    if answer.is_empty() || !answer.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    answer.parse().ok().filter(|&horizon| horizon > 0)
}
