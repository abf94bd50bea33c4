//! Speed Tune Core - Rust Engine
//!
//! Deterministic turn-meter simulator with a brute-force speed-tune search.
//!
//! # Architecture
//!
//! - **core**: Tick clock and fixed-point speed / turn-meter values
//! - **models**: Domain types (Actor, SimulationState, TurnLog)
//! - **orchestrator**: Tick loop producing turn orders
//! - **scenario**: Multi-phase encounters with reinforcement waves
//! - **search**: Enumerate speed assignments until a turn order matches
//!
//! # Critical Invariants
//!
//! 1. Speeds and meters are fixed-point integers (no floating point)
//! 2. A meter must be strictly above 100 to act
//! 3. Meter ties go to the actor that joined first
//! 4. Every run starts from fresh state; nothing leaks between runs

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod scenario;
pub mod search;

// Re-exports for convenience
pub use core::meter::{ParseDecimalError, Speed, TurnMeter, FULL_TURN_METER};
pub use core::time::TickClock;
pub use models::{
    actor::{Actor, ActorConfig, ActorId, Origin, ParseActorError},
    state::SimulationState,
    turn::{Turn, TurnLog},
};
pub use orchestrator::{
    compute_config_hash, turn_order, PhaseOutcome, PhaseResult, Simulation, SimulationError,
    SimulationSnapshot, TurnBudget,
};
pub use scenario::{Phase, PhaseSummary, Scenario, ScenarioResult};
pub use search::{
    SearchConfig, SearchError, SearchOptions, SearchOutcome, SearchReport, SpeedTuneSearch,
};
