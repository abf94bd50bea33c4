//! Domain models for the turn-meter simulator

pub mod actor;
pub mod state;
pub mod turn;

// Re-exports
pub use actor::{Actor, ActorConfig, ActorId, Origin, ParseActorError};
pub use state::SimulationState;
pub use turn::{Turn, TurnLog};
