//! Scenario Composer - staged reinforcement encounters
//!
//! A scenario is an ordered list of phases. Each phase adds its
//! reinforcements to everyone already present and then advances the shared
//! simulation by its turn budget. Actors never leave and meters are never
//! reset between phases: an actor present in phase 1 carries whatever meter
//! it accrued into phase 2, while a reinforcement starts from zero on the
//! first tick after it joins.
//!
//! `run` builds a fresh [`Simulation`] every time, so the same roster can
//! be run through any number of scenarios without resetting anything.
//!
//! # Example
//!
//! ```rust
//! use speed_tune_core_rs::scenario::{default_spider_team, Scenario};
//!
//! let result = Scenario::spider_den().run(&default_spider_team()).unwrap();
//! assert!(result.is_complete());
//! assert_eq!(result.turns.len(), 27);
//! assert_eq!(result.turns.names()[..4], ["CH1", "CH2", "Ignatius", "Crypt King"]);
//! ```

mod presets;

pub use presets::{default_spider_team, spiderling, SPIDERLING_SPEED};

use crate::models::actor::{format_label, ActorConfig, Origin};
use crate::models::turn::TurnLog;
use crate::orchestrator::{PhaseOutcome, Simulation, SimulationError, SimulationSnapshot, TurnBudget};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

// ============================================================================
// Configuration Types
// ============================================================================

/// One stage of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// Actors joining at the start of this phase
    #[serde(default)]
    pub reinforcements: Vec<ActorConfig>,

    /// Turns to run once they have joined
    #[serde(flatten)]
    pub budget: TurnBudget,
}

impl Phase {
    pub fn new(reinforcements: Vec<ActorConfig>, turns: usize) -> Self {
        Self {
            reinforcements,
            budget: TurnBudget::turns(turns),
        }
    }
}

/// Ordered list of phases run over one shared simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub phases: Vec<Phase>,
}

// ============================================================================
// Results
// ============================================================================

/// Per-phase summary of a scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSummary {
    /// Phase index (0-based), also the wave number of its reinforcements
    pub wave: usize,

    /// Actors ticking during this phase
    pub actors_active: usize,

    pub turns_taken: usize,
    pub ticks_elapsed: usize,
    pub outcome: PhaseOutcome,
}

/// Complete result of one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: String,

    /// All turns across all phases, in order
    pub turns: TurnLog,

    pub phases: Vec<PhaseSummary>,

    /// Meters of every actor when the last phase ended
    pub final_state: SimulationSnapshot,
}

impl ScenarioResult {
    /// True when no phase was truncated
    pub fn is_complete(&self) -> bool {
        self.phases
            .iter()
            .all(|p| p.outcome == PhaseOutcome::Completed)
    }

    /// One display line per turn: `name (speed spd)`, reinforcements indented
    pub fn labels(&self) -> Vec<String> {
        self.turns
            .turns()
            .iter()
            .filter_map(|turn| self.final_state.actors.get(turn.actor.index()))
            .map(|a| format_label(&a.name, a.speed, a.origin))
            .collect()
    }
}

// ============================================================================
// Scenario
// ============================================================================

impl Scenario {
    pub fn new(name: impl Into<String>, phases: Vec<Phase>) -> Self {
        Self {
            name: name.into(),
            phases,
        }
    }

    /// Check the scenario can run with some roster
    ///
    /// Needs at least one phase, and reinforcement names unique across all
    /// phases (a clash with the roster itself is caught by `run`).
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.phases.is_empty() {
            return Err(SimulationError::InvalidConfig(format!(
                "scenario '{}' has no phases",
                self.name
            )));
        }

        let mut names = HashSet::new();
        for actor in self.phases.iter().flat_map(|p| &p.reinforcements) {
            if !names.insert(actor.name.as_str()) {
                return Err(SimulationError::DuplicateActor(actor.name.clone()));
            }
        }

        Ok(())
    }

    /// Total turns budgeted across all phases
    pub fn total_turns(&self) -> usize {
        self.phases.iter().map(|p| p.budget.turns).sum()
    }

    /// Run every phase over a fresh simulation seeded with `roster`
    pub fn run(&self, roster: &[ActorConfig]) -> Result<ScenarioResult, SimulationError> {
        self.validate()?;

        let mut sim = Simulation::with_roster(roster.iter().cloned())?;
        let mut turns = TurnLog::new();
        let mut phases = Vec::with_capacity(self.phases.len());

        for (wave, phase) in self.phases.iter().enumerate() {
            sim.join(
                phase.reinforcements.iter().cloned(),
                Origin::Reinforcement { wave },
            )?;

            let result = sim.advance(phase.budget);
            debug!(
                scenario = %self.name,
                wave,
                actors = sim.state().num_actors(),
                turns = result.turns.len(),
                ticks = result.ticks_elapsed,
                "phase finished"
            );

            phases.push(PhaseSummary {
                wave,
                actors_active: sim.state().num_actors(),
                turns_taken: result.turns.len(),
                ticks_elapsed: result.ticks_elapsed,
                outcome: result.outcome,
            });
            turns.extend(result.turns);
        }

        Ok(ScenarioResult {
            scenario: self.name.clone(),
            turns,
            phases,
            final_state: sim.snapshot(),
        })
    }
}
