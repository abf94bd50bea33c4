//! Snapshot - point-in-time view of a simulation
//!
//! Captures every actor's speed and turn meter so results can be inspected
//! or rendered as JSON after the run that produced them has ended.
//!
//! Also provides `compute_config_hash`, the SHA-256 fingerprint that tags
//! search reports.

use crate::core::meter::{Speed, TurnMeter};
use crate::models::actor::{Actor, ActorId, Origin};
use crate::models::state::SimulationState;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Every actor's meter at one tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Tick at which the snapshot was taken
    pub tick: usize,

    /// Actor states in join order
    pub actors: Vec<ActorSnapshot>,
}

/// Actor state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: String,
    pub speed: Speed,
    pub origin: Origin,
    pub meter: TurnMeter,
}

impl ActorSnapshot {
    fn new(actor: &Actor, meter: TurnMeter) -> Self {
        ActorSnapshot {
            id: actor.id(),
            name: actor.name().to_string(),
            speed: actor.speed(),
            origin: actor.origin(),
            meter,
        }
    }
}

impl SimulationSnapshot {
    pub(crate) fn capture(state: &SimulationState, tick: usize) -> Self {
        SimulationSnapshot {
            tick,
            actors: state
                .iter()
                .map(|(actor, meter)| ActorSnapshot::new(actor, meter))
                .collect(),
        }
    }

    /// Meter of the named actor
    pub fn meter_of(&self, name: &str) -> Option<TurnMeter> {
        self.actors.iter().find(|a| a.name == name).map(|a| a.meter)
    }

    /// Names paired with meters rounded to whole points
    pub fn rounded_meters(&self) -> Vec<(&str, i64)> {
        self.actors
            .iter()
            .map(|a| (a.name.as_str(), a.meter.round()))
            .collect()
    }
}

// ============================================================================
// Config fingerprint
// ============================================================================

/// SHA-256 of a value's JSON form, as lowercase hex
///
/// The value goes through `serde_json::Value` first. Its object map is
/// ordered by key, so the digest does not depend on field declaration order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_value(config)?.to_string();
    Ok(format!("{:x}", Sha256::digest(json.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::actor::ActorConfig;

    #[test]
    fn test_config_hash_ignores_field_order() {
        #[derive(Serialize)]
        struct SpeedFirst {
            speed: u32,
            name: &'static str,
        }

        #[derive(Serialize)]
        struct NameFirst {
            name: &'static str,
            speed: u32,
        }

        let a = compute_config_hash(&SpeedFirst { speed: 190, name: "CB" }).unwrap();
        let b = compute_config_hash(&NameFirst { name: "CB", speed: 190 }).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_config_hash_tracks_speed_change() {
        let slow = compute_config_hash(&ActorConfig::new("CH1", 300)).unwrap();
        let fast = compute_config_hash(&ActorConfig::new("CH1", 301)).unwrap();
        assert_ne!(slow, fast);
        assert_eq!(slow, compute_config_hash(&ActorConfig::new("CH1", 300)).unwrap());
    }

    #[test]
    fn test_snapshot_roundtrips_through_json() {
        let mut state = SimulationState::new();
        state
            .join(vec![ActorConfig::new("CB", 190)], Origin::Roster)
            .unwrap();
        state.accrue_all();

        let snapshot = SimulationSnapshot::capture(&state, 1);
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: SimulationSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, snapshot);
        assert_eq!(restored.meter_of("CB").map(|m| m.to_string()), Some("13.3".to_string()));
    }
}
