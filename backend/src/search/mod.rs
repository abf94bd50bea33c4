//! Speed-Tune Search
//!
//! Inverts the turn-order engine: enumerate speed assignments for a set of
//! tuned actors, run the scenario for each, and stop at the first
//! assignment whose turn order satisfies a target pattern.
//!
//! - **space**: dimensions, inclusive bounds and the non-decreasing
//!   `not_below` constraint, plus the lexicographic candidate enumerator
//! - **target**: JSON-friendly boolean pattern over a turn log
//! - **config**: roster slots + space + scenario + target, with validation
//! - **runner**: sequential or rayon-parallel execution with cancellation
//!
//! Candidates are fully independent: each one builds fresh actors and a
//! fresh simulation, so outer-dimension values can be searched in parallel
//! while still reporting the first match in enumeration order.

pub mod config;
pub mod runner;
pub mod space;
pub mod target;

pub use config::{RosterSlot, SearchConfig};
pub use runner::{
    CancelToken, SearchOptions, SearchOutcome, SearchReport, SpeedTuneMatch, SpeedTuneSearch,
    TunedSpeed,
};
pub use space::{Candidates, Dimension, LowerBound, SearchSpace};
pub use target::TargetPattern;

use crate::orchestrator::SimulationError;
use thiserror::Error;

/// Search error types
#[derive(Debug, Error)]
pub enum SearchError {
    /// Malformed search space (bad bounds, unknown references)
    #[error("Invalid search space: {0}")]
    InvalidSpace(String),

    /// Roster, space, scenario and target do not fit together
    #[error("Invalid search config: {0}")]
    InvalidConfig(String),

    /// Scenario failed while evaluating a candidate
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// Config file is not valid JSON for a search config
    #[error("Failed to parse search config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Worker pool could not be created
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),
}
