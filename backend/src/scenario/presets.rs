//! Built-in scenarios and rosters

use super::{Phase, Scenario};
use crate::core::meter::Speed;
use crate::models::actor::ActorConfig;

/// Speed of every spiderling add
pub const SPIDERLING_SPEED: Speed = Speed::from_whole(150);

/// Spiderling `n` (1-based)
pub fn spiderling(n: usize) -> ActorConfig {
    ActorConfig::new(format!("Spiderling {}", n), SPIDERLING_SPEED)
}

impl Scenario {
    /// Spider den: adds arrive in three waves around the team's opening turns
    ///
    /// - wave 0: spiderlings 1-6 are present from the first tick; 1 turn
    /// - wave 1: spiderlings 7-8 join; 1 more turn
    /// - wave 2: spiderlings 9-10 join; 25 more turns
    pub fn spider_den() -> Self {
        Scenario::new(
            "spider_den",
            vec![
                Phase::new((1..=6).map(spiderling).collect(), 1),
                Phase::new((7..=8).map(spiderling).collect(), 1),
                Phase::new((9..=10).map(spiderling).collect(), 25),
            ],
        )
    }
}

/// Default five-champion team for the spider den
pub fn default_spider_team() -> Vec<ActorConfig> {
    vec![
        ActorConfig::new("CH1", 300),
        ActorConfig::new("CH2", 300),
        ActorConfig::new("Ignatius", 255),
        ActorConfig::new("Crypt King", 255),
        ActorConfig::new("Renegade", 150),
    ]
}
