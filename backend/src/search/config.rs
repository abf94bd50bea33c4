//! Search configuration
//!
//! A search is fully described by four pieces of data: the roster (which
//! actors have fixed speeds and which are tuned), the space of tuned
//! speeds, the scenario each candidate runs through, and the target
//! pattern the resulting turn order must satisfy. All four deserialize
//! from one JSON document.

use super::space::{Dimension, LowerBound, SearchSpace};
use super::target::TargetPattern;
use super::SearchError;
use crate::core::meter::Speed;
use crate::models::actor::ActorConfig;
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One roster position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RosterSlot {
    /// Actor whose speed is the same for every candidate
    Fixed { name: String, speed: Speed },

    /// Actor whose speed comes from the search dimension of the same name
    Tuned { name: String },
}

impl RosterSlot {
    pub fn fixed(name: impl Into<String>, speed: impl Into<Speed>) -> Self {
        RosterSlot::Fixed {
            name: name.into(),
            speed: speed.into(),
        }
    }

    pub fn tuned(name: impl Into<String>) -> Self {
        RosterSlot::Tuned { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            RosterSlot::Fixed { name, .. } | RosterSlot::Tuned { name } => name,
        }
    }
}

/// Complete speed-tune search definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Roster in join order (join order breaks meter ties)
    pub roster: Vec<RosterSlot>,

    pub space: SearchSpace,

    pub scenario: Scenario,

    pub target: TargetPattern,
}

impl SearchConfig {
    /// Parse and validate a JSON search definition
    pub fn from_json(text: &str) -> Result<Self, SearchError> {
        let config: SearchConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the four parts fit together
    ///
    /// - the space is well formed
    /// - every tuned slot has exactly one dimension and vice versa
    /// - roster and reinforcement names are unique
    /// - the target only mentions actors that exist
    pub fn validate(&self) -> Result<(), SearchError> {
        self.space.validate()?;
        self.scenario.validate()?;

        let mut names: HashSet<&str> = HashSet::new();
        for slot in &self.roster {
            if !names.insert(slot.name()) {
                return Err(SearchError::InvalidConfig(format!(
                    "duplicate roster name '{}'",
                    slot.name()
                )));
            }
            if let RosterSlot::Tuned { name } = slot {
                if self.space.index_of(name).is_none() {
                    return Err(SearchError::InvalidConfig(format!(
                        "tuned actor '{}' has no search dimension",
                        name
                    )));
                }
            }
        }

        for dim in self.space.names() {
            let tuned = self
                .roster
                .iter()
                .any(|slot| matches!(slot, RosterSlot::Tuned { name } if name == dim));
            if !tuned {
                return Err(SearchError::InvalidConfig(format!(
                    "dimension '{}' does not match a tuned roster slot",
                    dim
                )));
            }
        }

        for actor in self.scenario.phases.iter().flat_map(|p| &p.reinforcements) {
            if !names.insert(actor.name.as_str()) {
                return Err(SearchError::InvalidConfig(format!(
                    "reinforcement '{}' clashes with a roster name",
                    actor.name
                )));
            }
        }

        for actor in self.target.referenced_actors() {
            if !names.contains(actor) {
                return Err(SearchError::InvalidConfig(format!(
                    "target mentions unknown actor '{}'",
                    actor
                )));
            }
        }

        Ok(())
    }

    /// Dimension index feeding each roster slot (None for fixed slots)
    pub(crate) fn slot_dimensions(&self) -> Vec<Option<usize>> {
        self.roster
            .iter()
            .map(|slot| match slot {
                RosterSlot::Fixed { .. } => None,
                RosterSlot::Tuned { name } => self.space.index_of(name),
            })
            .collect()
    }

    /// Roster for one candidate (`values` in dimension order)
    pub fn roster_for(&self, values: &[u32]) -> Result<Vec<ActorConfig>, SearchError> {
        self.roster_with(&self.slot_dimensions(), values)
    }

    /// `roster_for` with slot dimensions already resolved
    pub(crate) fn roster_with(
        &self,
        slot_dims: &[Option<usize>],
        values: &[u32],
    ) -> Result<Vec<ActorConfig>, SearchError> {
        if values.len() != self.space.dimensions.len() {
            return Err(SearchError::InvalidConfig(format!(
                "candidate has {} value(s), the space has {} dimension(s)",
                values.len(),
                self.space.dimensions.len()
            )));
        }

        Ok(self
            .roster
            .iter()
            .zip(slot_dims.iter().copied())
            .map(|(slot, dim)| {
                let speed = match (slot, dim) {
                    (RosterSlot::Fixed { speed, .. }, _) => *speed,
                    (RosterSlot::Tuned { .. }, Some(d)) => Speed::from_whole(values[d]),
                    (RosterSlot::Tuned { .. }, None) => Speed::ZERO,
                };
                ActorConfig::new(slot.name(), speed)
            })
            .collect())
    }

    /// The spider-den tune: five champions, all tuned
    ///
    /// Renegade 125-174, Crypt King 200-274, Ignatius from Crypt King to
    /// 274, CH2 from Ignatius to 309, CH1 from CH2 to 309.
    pub fn spider_den() -> Self {
        let not_below = |name: &str| LowerBound::NotBelow(name.to_string());

        SearchConfig {
            roster: vec![
                RosterSlot::tuned("CH1"),
                RosterSlot::tuned("CH2"),
                RosterSlot::tuned("Ignatius"),
                RosterSlot::tuned("Crypt King"),
                RosterSlot::tuned("Renegade"),
            ],
            space: SearchSpace::new(vec![
                Dimension::new("Renegade", LowerBound::Fixed(125), 174),
                Dimension::new("Crypt King", LowerBound::Fixed(200), 274),
                Dimension::new("Ignatius", not_below("Crypt King"), 274),
                Dimension::new("CH2", not_below("Ignatius"), 309),
                Dimension::new("CH1", not_below("CH2"), 309),
            ]),
            scenario: Scenario::spider_den(),
            target: TargetPattern::spider_den(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spider_den_config_is_valid() {
        assert!(SearchConfig::spider_den().validate().is_ok());
    }

    #[test]
    fn test_roster_for_follows_roster_order() {
        let config = SearchConfig::spider_den();
        // Dimension order: Renegade, Crypt King, Ignatius, CH2, CH1
        let roster = config.roster_for(&[150, 255, 256, 299, 300]).unwrap();
        let pairs: Vec<(String, String)> = roster
            .iter()
            .map(|a| (a.name.clone(), a.speed.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("CH1".to_string(), "300".to_string()),
                ("CH2".to_string(), "299".to_string()),
                ("Ignatius".to_string(), "256".to_string()),
                ("Crypt King".to_string(), "255".to_string()),
                ("Renegade".to_string(), "150".to_string()),
            ]
        );
    }

    #[test]
    fn test_roster_for_rejects_wrong_length() {
        let config = SearchConfig::spider_den();
        assert!(matches!(
            config.roster_for(&[150, 255]),
            Err(SearchError::InvalidConfig(_))
        ));
        assert!(matches!(
            config.roster_for(&[150, 255, 255, 300, 300, 300]),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_catches_mismatches() {
        let mut untuned = SearchConfig::spider_den();
        untuned.roster[0] = RosterSlot::fixed("CH1", 300);
        assert!(matches!(untuned.validate(), Err(SearchError::InvalidConfig(_))));

        let mut typo = SearchConfig::spider_den();
        typo.target = TargetPattern::count("Spiderling 11", 1);
        assert!(matches!(typo.validate(), Err(SearchError::InvalidConfig(_))));

        let mut clash = SearchConfig::spider_den();
        clash.roster.push(RosterSlot::fixed("Spiderling 3", 150));
        assert!(matches!(clash.validate(), Err(SearchError::InvalidConfig(_))));

        let mut stray = SearchConfig::spider_den();
        stray.roster.push(RosterSlot::tuned("Ghost"));
        assert!(matches!(stray.validate(), Err(SearchError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_round_trip_of_preset() {
        let json = serde_json::to_string_pretty(&SearchConfig::spider_den()).unwrap();
        let parsed = SearchConfig::from_json(&json).unwrap();
        assert_eq!(parsed, SearchConfig::spider_den());

        assert!(matches!(
            SearchConfig::from_json("{not json"),
            Err(SearchError::Parse(_))
        ));
    }
}
