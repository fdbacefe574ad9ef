//! Battle orchestration
//!
//! A `Battlefield` owns at most one battle session at a time and walks it
//! through deployment, combat and results. The resolver decides the outcome
//! once when combat starts; the timeline then plays it back for the visual
//! simulation.

pub mod field;
pub mod report;
pub mod timeline;

use serde::{Deserialize, Serialize};

pub use field::{BattleSession, Battlefield, PLAYER_DEPLOY_MAX, PLAYER_DEPLOY_MIN};
pub use report::{BattleNotice, BattleReport, CasualtySummary, ITEM_TABLE};
pub use timeline::{Timeline, interpolate_army};

/// Stage of a battle session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Stacks can be repositioned
    Deployment,
    /// Resolved; the timeline is playing
    Combat,
    /// Timeline done, report available
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattleOutcome {
    #[default]
    None,
    Victory,
    Defeat,
    Retreat,
}

/// What a victory does to the territory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattleType {
    #[default]
    Raid,
    Conquer,
}

/// Territory side effects of a victory, provided by the world layer
pub trait WorldHooks {
    /// Take control of the territory; returns a message for the loot report
    fn conquer(&mut self, territory_id: &str) -> String;

    /// Plunder the territory; returns a message for the loot report
    fn raid(&mut self, territory_id: &str) -> String;
}
