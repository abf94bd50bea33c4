//! Turn log: the ordered record of who acted and when.
//!
//! Every turn taken during a simulation is appended here in order. The log
//! is the product of a run: the scenario concatenates phase logs, and the
//! speed-tune search evaluates its target pattern against the final log.
//!
//! # Example
//!
//! ```rust
//! use speed_tune_core_rs::{turn_order, ActorConfig};
//!
//! let roster = vec![ActorConfig::new("Kreela", 231), ActorConfig::new("CB", 190)];
//! let result = turn_order(&roster, 2).unwrap();
//!
//! assert_eq!(result.turns.names(), vec!["Kreela", "CB"]);
//! assert_eq!(result.turns.count_for("Kreela"), 1);
//! assert_eq!(result.turns.from_end(0).map(|t| t.actor_name.as_str()), Some("CB"));
//! ```

use crate::core::meter::TurnMeter;
use crate::models::actor::ActorId;
use serde::{Deserialize, Serialize};

/// One turn taken by one actor.
///
/// `meter` is the value the actor held when it was selected, before the
/// reset; it is always strictly above the full-meter threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Tick on which the turn was taken (1-based: the first tick is tick 1)
    pub tick: usize,
    pub actor: ActorId,
    pub actor_name: String,
    pub meter: TurnMeter,
}

/// Append-only sequence of turns in the order they were taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnLog {
    turns: Vec<Turn>,
}

impl TurnLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a turn
    pub fn log(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Append every turn of `other`, keeping order
    pub fn extend(&mut self, other: TurnLog) {
        self.turns.extend(other.turns);
    }

    /// Number of turns recorded
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if no turn was taken
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns in order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Actor identities in turn order
    pub fn actors(&self) -> Vec<ActorId> {
        self.turns.iter().map(|t| t.actor).collect()
    }

    /// Actor names in turn order
    pub fn names(&self) -> Vec<&str> {
        self.turns.iter().map(|t| t.actor_name.as_str()).collect()
    }

    /// How many turns the named actor took
    pub fn count_for(&self, name: &str) -> usize {
        self.turns.iter().filter(|t| t.actor_name == name).count()
    }

    /// Turns taken by one actor
    pub fn turns_for(&self, actor: ActorId) -> Vec<&Turn> {
        self.turns.iter().filter(|t| t.actor == actor).collect()
    }

    /// Turn at `offset` from the end (0 = last); None past the start
    pub fn from_end(&self, offset: usize) -> Option<&Turn> {
        self.turns
            .len()
            .checked_sub(offset)
            .and_then(|n| n.checked_sub(1))
            .map(|i| &self.turns[i])
    }

    /// The last `n` turns (fewer if the log is shorter)
    pub fn tail(&self, n: usize) -> &[Turn] {
        &self.turns[self.turns.len().saturating_sub(n)..]
    }
}

impl<'a> IntoIterator for &'a TurnLog {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(tick: usize, index: usize, name: &str) -> Turn {
        Turn {
            tick,
            actor: ActorId::new(index),
            actor_name: name.to_string(),
            meter: TurnMeter::from_points(101),
        }
    }

    #[test]
    fn test_from_end_and_tail() {
        let mut log = TurnLog::new();
        assert!(log.from_end(0).is_none());

        log.log(turn(7, 0, "Kreela"));
        log.log(turn(8, 5, "CB"));
        log.log(turn(9, 3, "Rhazin"));

        assert_eq!(log.from_end(0).unwrap().actor_name, "Rhazin");
        assert_eq!(log.from_end(2).unwrap().actor_name, "Kreela");
        assert!(log.from_end(3).is_none());
        assert!(log.from_end(usize::MAX).is_none());
        assert_eq!(log.tail(2).len(), 2);
        assert_eq!(log.tail(10).len(), 3);
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut first = TurnLog::new();
        first.log(turn(7, 0, "Kreela"));
        let mut second = TurnLog::new();
        second.log(turn(8, 5, "CB"));
        second.log(turn(14, 0, "Kreela"));

        first.extend(second);
        assert_eq!(first.names(), vec!["Kreela", "CB", "Kreela"]);
        assert_eq!(first.count_for("Kreela"), 2);
        assert_eq!(first.turns_for(ActorId::new(0)).len(), 2);
    }
}
