//! Simulation State
//!
//! Holds every actor that has joined one simulation together with its turn
//! meter. Meters are stored beside the actors rather than inside them, and
//! a state is created fresh for every run, so meter values can never leak
//! from one simulation into another.
//!
//! # Critical Invariants
//!
//! 1. **Join order is identity**: `ActorId(i)` is the i-th actor to join;
//!    it is also the tie-break order when several meters are equal.
//! 2. **Append-only roster**: actors join, they never leave.
//! 3. **Unique names**: no two actors in one state share a name.
//! 4. **Engine-only mutation**: meters are only accrued and reset by the
//!    turn-order engine; outside the crate they are read-only.

use crate::core::meter::TurnMeter;
use crate::models::actor::{Actor, ActorConfig, ActorId, Origin};
use crate::orchestrator::SimulationError;
use std::collections::{HashMap, HashSet};

/// Complete state of one simulation run
///
/// # Example
///
/// ```rust
/// use speed_tune_core_rs::{ActorConfig, Origin, SimulationState, TurnMeter};
///
/// let mut state = SimulationState::new();
/// let ids = state
///     .join(vec![ActorConfig::new("Kreela", 231), ActorConfig::new("CB", 190)], Origin::Roster)
///     .unwrap();
///
/// assert_eq!(state.num_actors(), 2);
/// assert_eq!(state.meter(ids[1]), Some(TurnMeter::ZERO));
/// assert_eq!(state.id_of("CB"), Some(ids[1]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    /// Actors in join order
    actors: Vec<Actor>,

    /// Turn meter per actor, parallel to `actors`
    meters: Vec<TurnMeter>,

    /// Name → id lookup
    by_name: HashMap<String, ActorId>,
}

impl SimulationState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Add actors with empty meters
    ///
    /// Either every config joins or none does: a name clash with an actor
    /// already present, or within `configs`, rejects the whole batch.
    pub fn join(
        &mut self,
        configs: impl IntoIterator<Item = ActorConfig>,
        origin: Origin,
    ) -> Result<Vec<ActorId>, SimulationError> {
        let configs: Vec<ActorConfig> = configs.into_iter().collect();

        let mut seen = HashSet::new();
        for config in &configs {
            if self.by_name.contains_key(&config.name) || !seen.insert(config.name.as_str()) {
                return Err(SimulationError::DuplicateActor(config.name.clone()));
            }
        }

        let mut ids = Vec::with_capacity(configs.len());
        for config in configs {
            let id = ActorId::new(self.actors.len());
            self.by_name.insert(config.name.clone(), id);
            self.actors.push(Actor::new(id, config, origin));
            self.meters.push(TurnMeter::ZERO);
            ids.push(id);
        }
        Ok(ids)
    }

    /// Number of actors joined so far
    pub fn num_actors(&self) -> usize {
        self.actors.len()
    }

    /// All actors in join order
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Get an actor by id
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.index())
    }

    /// Look up an actor's id by name
    pub fn id_of(&self, name: &str) -> Option<ActorId> {
        self.by_name.get(name).copied()
    }

    /// Current meter of an actor
    pub fn meter(&self, id: ActorId) -> Option<TurnMeter> {
        self.meters.get(id.index()).copied()
    }

    /// Current meter of an actor, by name
    pub fn meter_of(&self, name: &str) -> Option<TurnMeter> {
        self.id_of(name).and_then(|id| self.meter(id))
    }

    /// Actors paired with their meters, in join order
    pub fn iter(&self) -> impl Iterator<Item = (&Actor, TurnMeter)> {
        self.actors.iter().zip(self.meters.iter().copied())
    }

    /// Accrue one tick of meter for every actor
    pub(crate) fn accrue_all(&mut self) {
        for (actor, meter) in self.actors.iter().zip(self.meters.iter_mut()) {
            meter.accrue(actor.speed());
        }
    }

    /// Actor with the highest strictly-full meter; first in join order on ties
    pub(crate) fn next_ready(&self) -> Option<(ActorId, TurnMeter)> {
        let mut best: Option<(ActorId, TurnMeter)> = None;
        for (index, meter) in self.meters.iter().copied().enumerate() {
            if !meter.is_full() {
                continue;
            }
            // Strict '>' keeps the earlier actor on equal meters
            if best.map_or(true, |(_, top)| meter > top) {
                best = Some((ActorId::new(index), meter));
            }
        }
        best
    }

    /// Empty an actor's meter after its turn
    pub(crate) fn reset_meter(&mut self, id: ActorId) {
        if let Some(meter) = self.meters.get_mut(id.index()) {
            meter.reset();
        }
    }
}
