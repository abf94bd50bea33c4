//! Target patterns: boolean conditions over a finished turn order.
//!
//! Patterns are plain data so a search can be described in JSON:
//!
//! ```json
//! {"op": "and", "conditions": [
//!   {"op": "count", "actor": "Crypt King", "exactly": 3},
//!   {"op": "at_from_end", "actor": "Spiderling 1", "offset": 0}
//! ]}
//! ```

use crate::models::turn::TurnLog;
use serde::{Deserialize, Serialize};

/// Boolean pattern evaluated against a turn log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TargetPattern {
    /// The named actor took exactly this many turns
    Count { actor: String, exactly: usize },

    /// The named actor took the turn `offset` places from the end (0 = last)
    AtFromEnd { actor: String, offset: usize },

    /// Logical AND (short-circuit evaluation)
    And { conditions: Vec<TargetPattern> },

    /// Logical OR (short-circuit evaluation)
    Or { conditions: Vec<TargetPattern> },

    /// Logical NOT
    Not { condition: Box<TargetPattern> },
}

impl TargetPattern {
    pub fn count(actor: impl Into<String>, exactly: usize) -> Self {
        TargetPattern::Count {
            actor: actor.into(),
            exactly,
        }
    }

    pub fn at_from_end(actor: impl Into<String>, offset: usize) -> Self {
        TargetPattern::AtFromEnd {
            actor: actor.into(),
            offset,
        }
    }

    /// Shorthand for `at_from_end(actor, 0)`
    pub fn last(actor: impl Into<String>) -> Self {
        Self::at_from_end(actor, 0)
    }

    pub fn and(conditions: Vec<TargetPattern>) -> Self {
        TargetPattern::And { conditions }
    }

    pub fn or(conditions: Vec<TargetPattern>) -> Self {
        TargetPattern::Or { conditions }
    }

    pub fn not(condition: TargetPattern) -> Self {
        TargetPattern::Not {
            condition: Box::new(condition),
        }
    }

    /// Evaluate against a turn log
    ///
    /// Positions before the start of the log never match, so a log shorter
    /// than `offset + 1` fails every `at_from_end` condition.
    pub fn matches(&self, turns: &TurnLog) -> bool {
        match self {
            TargetPattern::Count { actor, exactly } => turns.count_for(actor) == *exactly,
            TargetPattern::AtFromEnd { actor, offset } => turns
                .from_end(*offset)
                .is_some_and(|turn| turn.actor_name == *actor),
            TargetPattern::And { conditions } => conditions.iter().all(|c| c.matches(turns)),
            TargetPattern::Or { conditions } => conditions.iter().any(|c| c.matches(turns)),
            TargetPattern::Not { condition } => !condition.matches(turns),
        }
    }

    /// Every actor name the pattern mentions
    pub fn referenced_actors(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_actors(&mut names);
        names
    }

    fn collect_actors<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TargetPattern::Count { actor, .. } | TargetPattern::AtFromEnd { actor, .. } => {
                if !names.contains(&actor.as_str()) {
                    names.push(actor);
                }
            }
            TargetPattern::And { conditions } | TargetPattern::Or { conditions } => {
                for condition in conditions {
                    condition.collect_actors(names);
                }
            }
            TargetPattern::Not { condition } => condition.collect_actors(names),
        }
    }

    /// Spider-den tune target
    ///
    /// Spiderling 1 acts twice and Crypt King three times, and Spiderling 1
    /// either closes the order or takes the second-to-last turn while Crypt
    /// King does not.
    pub fn spider_den() -> Self {
        const SPIDERLING: &str = "Spiderling 1";
        const CRYPT_KING: &str = "Crypt King";

        Self::and(vec![
            Self::count(SPIDERLING, 2),
            Self::count(CRYPT_KING, 3),
            Self::or(vec![
                Self::last(SPIDERLING),
                Self::and(vec![
                    Self::at_from_end(SPIDERLING, 1),
                    Self::not(Self::at_from_end(CRYPT_KING, 1)),
                ]),
            ]),
        ])
    }
}
