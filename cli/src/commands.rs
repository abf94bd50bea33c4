//! CLI command implementations

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use serde::Serialize;
use speed_tune_core_rs::scenario::default_spider_team;
use speed_tune_core_rs::search::{CancelToken, SearchConfig, SearchOptions, SearchOutcome};
use speed_tune_core_rs::{
    ActorConfig, PhaseResult, Scenario, Simulation, SimulationSnapshot, SpeedTuneSearch,
    TurnBudget,
};
use tracing::{info, warn};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the turn order of a roster
    Order {
        /// Actor as NAME=SPEED, in join order (repeatable)
        #[arg(short, long = "actor", value_name = "NAME=SPEED", required = true)]
        actors: Vec<ActorConfig>,
        /// Number of turns to simulate
        #[arg(short, long, default_value = "8")]
        turns: usize,
        /// Stop after this many ticks even if turns are missing
        #[arg(long)]
        tick_limit: Option<usize>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also print final meters
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run the spider den with the default team
    Simulate {
        /// Override a team member's speed as NAME=SPEED (repeatable)
        #[arg(short, long = "speed", value_name = "NAME=SPEED")]
        speeds: Vec<ActorConfig>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also print final meters
        #[arg(short, long)]
        verbose: bool,
    },
    /// Search for speeds whose turn order hits a target
    Search {
        /// Search definition (JSON); defaults to the spider-den tune
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Worker threads
        #[arg(long, default_value = "1")]
        threads: usize,
        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also print the chosen speeds and candidate count
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns the first failure of the command that ran
pub fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Order {
            actors,
            turns,
            tick_limit,
            json,
            verbose,
        } => show_order(actors, turns, tick_limit, json, verbose),
        Commands::Simulate {
            speeds,
            json,
            verbose,
        } => simulate(speeds, json, verbose),
        Commands::Search {
            config,
            threads,
            timeout_secs,
            json,
            verbose,
        } => search(config, threads, timeout_secs, json, verbose),
    }
}

#[derive(Serialize)]
struct OrderOutput {
    phase: PhaseResult,
    final_state: SimulationSnapshot,
}

/// Turn order of a single roster
///
/// # Errors
/// - `SimulationError::DuplicateActor` - two actors share a name
pub fn show_order(
    actors: Vec<ActorConfig>,
    turns: usize,
    tick_limit: Option<usize>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let mut sim = Simulation::with_roster(actors)?;
    let budget = match tick_limit {
        Some(limit) => TurnBudget::turns(turns).with_tick_limit(limit),
        None => TurnBudget::turns(turns),
    };
    let phase = sim.advance(budget);
    let final_state = sim.snapshot();

    if json {
        let output = OrderOutput { phase, final_state };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for turn in &phase.turns {
        println!("{:>5}  {:<20} {}", turn.tick, turn.actor_name, turn.meter);
    }
    if !phase.is_complete() {
        println!("(stopped after {} ticks)", phase.ticks_elapsed);
    }
    if verbose {
        print_meters(&final_state);
    }
    Ok(())
}

/// Spider den with the default team, optionally re-speeded
///
/// # Errors
/// - unknown team member in `speeds`
pub fn simulate(speeds: Vec<ActorConfig>, json: bool, verbose: bool) -> Result<()> {
    let mut team = default_spider_team();
    for change in speeds {
        match team.iter_mut().find(|a| a.name == change.name) {
            Some(member) => member.speed = change.speed,
            None => bail!("'{}' is not on the default team", change.name),
        }
    }

    let result = Scenario::spider_den().run(&team)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for label in result.labels() {
        println!("{label}");
    }
    if verbose {
        print_meters(&result.final_state);
    }
    Ok(())
}

/// Run a speed-tune search
///
/// # Errors
/// - config file missing or invalid
/// - worker pool could not be built
pub fn search(
    config: Option<PathBuf>,
    threads: usize,
    timeout_secs: Option<u64>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            SearchConfig::from_json(&text)
                .with_context(|| format!("loading search config {}", path.display()))?
        }
        None => SearchConfig::spider_den(),
    };

    let search = SpeedTuneSearch::new(config)?;
    let options = SearchOptions {
        threads,
        cancel: CancelToken::new(),
    };

    if let Some(secs) = timeout_secs {
        let cancel = options.cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            warn!(secs, "search timed out");
            cancel.cancel();
        });
    }

    let report = search.run(&options)?;
    info!(checked = report.candidates_checked, "search finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &report.outcome {
        SearchOutcome::Found(tune) => {
            if verbose {
                for speed in &tune.speeds {
                    println!("{}: {}", speed.name, speed.speed);
                }
                println!();
            }
            for label in tune.result.labels() {
                println!("{label}");
            }
        }
        SearchOutcome::Exhausted => println!("no match"),
        SearchOutcome::Cancelled => println!("cancelled"),
    }
    if verbose {
        println!(
            "checked {} of {} candidates",
            report.candidates_checked, report.space_size
        );
    }
    Ok(())
}

fn print_meters(snapshot: &SimulationSnapshot) {
    println!();
    for actor in &snapshot.actors {
        println!("{:<20} {}", actor.name, actor.meter.round());
    }
}
