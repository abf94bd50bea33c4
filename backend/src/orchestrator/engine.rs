//! Turn-Order Engine
//!
//! Main simulation loop: accrue turn meter for every joined actor, let at
//! most one actor act per tick, repeat until the turn budget is met.
//!
//! # Architecture
//!
//! ```text
//! For each tick t, until `turns` turns are recorded or the tick limit is hit:
//! 1. Advance the clock
//! 2. Accrue meter for every actor: tm += speed * 0.07
//! 3. Collect actors with tm strictly above 100
//! 4. If any: pick the highest tm (first joined on ties), log the turn, reset
//!    that actor's tm to 0
//! ```
//!
//! Several actors can be full on the same tick. Only one acts; the others
//! keep their meters, which only grow, and act on later ticks unless
//! overtaken.
//!
//! # Budget semantics
//!
//! A [`TurnBudget`] counts turns, not ticks. Every phase is also bounded by
//! a tick limit so it always terminates. When no explicit limit is given it
//! is `turns * ticks_to_fill(fastest actor)`, which can never cut a phase
//! short: the fastest actor alone refills inside that window after every
//! turn. A phase that stops on the tick limit is reported as
//! [`PhaseOutcome::Truncated`] instead of silently returning fewer turns.
//!
//! # Example
//!
//! ```rust
//! use speed_tune_core_rs::{ActorConfig, Simulation, TurnBudget};
//!
//! let mut sim = Simulation::with_roster(vec![
//!     ActorConfig::new("Kreela", 231),
//!     ActorConfig::new("CB", 190),
//! ])
//! .unwrap();
//!
//! let phase = sim.advance(TurnBudget::turns(2));
//! assert!(phase.is_complete());
//! assert_eq!(phase.turns.names(), vec!["Kreela", "CB"]);
//! assert_eq!(sim.current_tick(), 8);
//! ```

use crate::core::meter::Speed;
use crate::core::time::TickClock;
use crate::models::actor::{ActorConfig, ActorId, Origin};
use crate::models::state::SimulationState;
use crate::models::turn::{Turn, TurnLog};
use crate::orchestrator::snapshot::SimulationSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

// ============================================================================
// Configuration Types
// ============================================================================

/// How far one phase of a simulation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnBudget {
    /// Turns to record before the phase ends
    pub turns: usize,

    /// Maximum ticks the phase may take (None = derived from the fastest actor)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_limit: Option<usize>,
}

impl TurnBudget {
    /// Budget of `turns` turns with a derived tick limit
    pub fn turns(turns: usize) -> Self {
        Self {
            turns,
            tick_limit: None,
        }
    }

    /// Same budget, stopping after at most `ticks` ticks
    pub fn with_tick_limit(self, ticks: usize) -> Self {
        Self {
            tick_limit: Some(ticks),
            ..self
        }
    }
}

/// Simulation error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// Two actors in one simulation share a name
    #[error("Duplicate actor name: {0}")]
    DuplicateActor(String),

    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// Results
// ============================================================================

/// How a phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseOutcome {
    /// Every budgeted turn was taken
    Completed,

    /// The tick limit was reached first
    Truncated { turns_missing: usize },
}

/// Result of advancing a simulation by one budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResult {
    /// Turns taken in this phase, in order
    pub turns: TurnLog,

    /// Ticks the phase consumed
    pub ticks_elapsed: usize,

    pub outcome: PhaseOutcome,
}

impl PhaseResult {
    /// True unless the tick limit cut the phase short
    pub fn is_complete(&self) -> bool {
        self.outcome == PhaseOutcome::Completed
    }
}

// ============================================================================
// Simulation
// ============================================================================

/// One turn-meter simulation: actors, their meters and the clock
///
/// A `Simulation` is the mutable context of exactly one run. Build a new
/// one for every run; meters start at zero when an actor joins and are
/// never reset except by taking a turn.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    /// Actors and meters
    state: SimulationState,

    /// Ticks elapsed across all phases
    clock: TickClock,
}

impl Simulation {
    /// Create an empty simulation at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simulation whose initial actors are `roster`
    pub fn with_roster(
        roster: impl IntoIterator<Item = ActorConfig>,
    ) -> Result<Self, SimulationError> {
        let mut sim = Self::new();
        sim.join(roster, Origin::Roster)?;
        Ok(sim)
    }

    /// Add actors; they accrue meter from the next tick on
    pub fn join(
        &mut self,
        configs: impl IntoIterator<Item = ActorConfig>,
        origin: Origin,
    ) -> Result<Vec<ActorId>, SimulationError> {
        self.state.join(configs, origin)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get reference to simulation state
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Get current tick number
    pub fn current_tick(&self) -> usize {
        self.clock.current_tick()
    }

    /// Capture every actor's meter at the current tick
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot::capture(&self.state, self.clock.current_tick())
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Run ticks until `budget.turns` turns are taken or the tick limit is hit
    pub fn advance(&mut self, budget: TurnBudget) -> PhaseResult {
        let tick_limit = budget
            .tick_limit
            .unwrap_or_else(|| self.derived_tick_limit(budget.turns));
        let start_tick = self.clock.current_tick();
        let mut turns = TurnLog::new();

        debug!(
            actors = self.state.num_actors(),
            turns = budget.turns,
            tick_limit,
            start_tick,
            "advancing simulation"
        );

        while turns.len() < budget.turns && self.clock.ticks_since(start_tick) < tick_limit {
            self.clock.advance_tick();
            self.state.accrue_all();

            let Some((actor, meter)) = self.state.next_ready() else {
                continue;
            };
            self.state.reset_meter(actor);

            let actor_name = self
                .state
                .actor(actor)
                .map(|a| a.name().to_string())
                .unwrap_or_default();
            let tick = self.clock.current_tick();
            trace!(tick, actor = %actor_name, %meter, "turn taken");

            turns.log(Turn {
                tick,
                actor,
                actor_name,
                meter,
            });
        }

        let ticks_elapsed = self.clock.ticks_since(start_tick);
        let outcome = if turns.len() < budget.turns {
            let turns_missing = budget.turns - turns.len();
            warn!(
                turns_missing,
                ticks_elapsed, tick_limit, "tick limit reached before turn budget"
            );
            PhaseOutcome::Truncated { turns_missing }
        } else {
            PhaseOutcome::Completed
        };

        PhaseResult {
            turns,
            ticks_elapsed,
            outcome,
        }
    }

    /// Ticks guaranteed to yield `turns` turns; 0 when nobody can ever act
    fn derived_tick_limit(&self, turns: usize) -> usize {
        self.state
            .actors()
            .iter()
            .map(|a| a.speed())
            .max()
            .and_then(Speed::ticks_to_fill)
            .map_or(0, |window| window.saturating_mul(turns))
    }
}

/// Turn order of a fresh roster over `turns` turns
///
/// # Example
///
/// ```rust
/// use speed_tune_core_rs::{turn_order, ActorConfig};
///
/// let roster = vec![ActorConfig::new("Kreela", 231), ActorConfig::new("Brago", 173)];
/// let result = turn_order(&roster, 1).unwrap();
/// assert_eq!(result.turns.names(), vec!["Kreela"]);
/// ```
pub fn turn_order(roster: &[ActorConfig], turns: usize) -> Result<PhaseResult, SimulationError> {
    let mut sim = Simulation::with_roster(roster.iter().cloned())?;
    Ok(sim.advance(TurnBudget::turns(turns)))
}
