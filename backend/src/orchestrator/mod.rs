//! Orchestrator - the turn-order tick loop
//!
//! See `engine.rs` for the loop itself and `snapshot.rs` for result capture.

pub mod engine;
pub mod snapshot;

// Re-export main types for convenience
pub use engine::{
    turn_order, PhaseOutcome, PhaseResult, Simulation, SimulationError, TurnBudget,
};

pub use snapshot::{compute_config_hash, ActorSnapshot, SimulationSnapshot};
