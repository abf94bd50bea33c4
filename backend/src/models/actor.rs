//! Actor model
//!
//! An actor is an identity plus a fixed speed. Its turn meter is NOT part
//! of the actor: meters belong to the [`SimulationState`] of one run, so an
//! actor description can be reused across any number of simulations without
//! carrying state from one into the next.
//!
//! [`SimulationState`]: crate::models::state::SimulationState

use crate::core::meter::{ParseDecimalError, Speed};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors parsing a `NAME=SPEED` actor description
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseActorError {
    #[error("expected NAME=SPEED, got '{0}'")]
    MissingSpeed(String),

    #[error("actor name must not be empty")]
    EmptyName,

    #[error("invalid speed for '{name}': {source}")]
    Speed {
        name: String,
        #[source]
        source: ParseDecimalError,
    },
}

/// Position of an actor in its simulation's join order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(usize);

impl ActorId {
    pub(crate) fn new(index: usize) -> Self {
        ActorId(index)
    }

    /// Join-order index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Actor description before it joins a simulation
///
/// # Example
/// ```
/// use speed_tune_core_rs::{ActorConfig, Speed};
///
/// let cfg: ActorConfig = "Crypt King=255".parse().unwrap();
/// assert_eq!(cfg.name, "Crypt King");
/// assert_eq!(cfg.speed, Speed::from_whole(255));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorConfig {
    pub name: String,
    pub speed: Speed,
}

impl ActorConfig {
    pub fn new(name: impl Into<String>, speed: impl Into<Speed>) -> Self {
        Self {
            name: name.into(),
            speed: speed.into(),
        }
    }
}

impl FromStr for ActorConfig {
    type Err = ParseActorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split on the last '=' so names may contain one
        let (name, speed) = s
            .rsplit_once('=')
            .ok_or_else(|| ParseActorError::MissingSpeed(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseActorError::EmptyName);
        }
        let speed: Speed = speed.parse().map_err(|source| ParseActorError::Speed {
            name: name.to_string(),
            source,
        })?;
        Ok(ActorConfig::new(name, speed))
    }
}

/// How an actor entered the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// Present from the first tick
    Roster,
    /// Added by a scenario phase (0-indexed)
    Reinforcement { wave: usize },
}

/// An actor that has joined a simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    name: String,
    speed: Speed,
    origin: Origin,
}

impl Actor {
    pub(crate) fn new(id: ActorId, config: ActorConfig, origin: Origin) -> Self {
        Self {
            id,
            name: config.name,
            speed: config.speed,
            origin,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_reinforcement(&self) -> bool {
        matches!(self.origin, Origin::Reinforcement { .. })
    }

    /// Display line for turn-order listings; reinforcements are tab-indented
    pub fn label(&self) -> String {
        format_label(&self.name, self.speed, self.origin)
    }
}

/// `name (speed spd)`, tab-indented for reinforcements
pub fn format_label(name: &str, speed: Speed, origin: Origin) -> String {
    match origin {
        Origin::Roster => format!("{} ({} spd)", name, speed),
        Origin::Reinforcement { .. } => format!("\t{} ({} spd)", name, speed),
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} spd)", self.name, self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actor_config() {
        let cfg: ActorConfig = "CH1=300".parse().unwrap();
        assert_eq!(cfg, ActorConfig::new("CH1", 300));

        let cfg: ActorConfig = "A=B=150.5".parse().unwrap();
        assert_eq!(cfg.name, "A=B");
        assert_eq!(cfg.speed.hundredths(), 15050);
    }

    #[test]
    fn test_parse_actor_config_errors() {
        assert!(matches!(
            "Kreela".parse::<ActorConfig>(),
            Err(ParseActorError::MissingSpeed(_))
        ));
        assert_eq!(" =12".parse::<ActorConfig>(), Err(ParseActorError::EmptyName));
        assert!(matches!(
            "Kreela=fast".parse::<ActorConfig>(),
            Err(ParseActorError::Speed { .. })
        ));
    }

    #[test]
    fn test_label_indents_reinforcements() {
        let roster = Actor::new(ActorId::new(0), ActorConfig::new("CH1", 300), Origin::Roster);
        let add = Actor::new(
            ActorId::new(5),
            ActorConfig::new("Spiderling 1", 150),
            Origin::Reinforcement { wave: 0 },
        );
        assert_eq!(roster.label(), "CH1 (300 spd)");
        assert_eq!(add.label(), "\tSpiderling 1 (150 spd)");
    }
}
