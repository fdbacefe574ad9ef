//! Post-battle reports: casualties, loot and outcome notices

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{BattleOutcome, BattleType};
use crate::army::{ArmyStack, total_count};
use crate::sim::CombatLogEntry;

/// Chance of an item dropping after a victory
pub const ITEM_DROP_CHANCE: f64 = 0.4;

/// Items a victory can yield
pub const ITEM_TABLE: &[&str] = &[
    "Rusted Blade",
    "Shadow Fang",
    "Vorpal Scythe",
    "Leather Vest",
    "Obsidian Plate",
    "Blood Chalice",
    "Cursed Ring",
];

/// Roll the post-victory item drop
pub fn roll_item_loot<R: Rng + ?Sized>(rng: &mut R) -> Option<&'static str> {
    if rng.random_bool(ITEM_DROP_CHANCE) {
        Some(ITEM_TABLE[rng.random_range(0..ITEM_TABLE.len())])
    } else {
        None
    }
}

/// Losses of one side relative to its pre-battle total
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CasualtySummary {
    pub initial: u64,
    pub remaining: u64,
    pub lost: u64,
    /// `lost / initial`, 0 for an empty side
    pub loss_ratio: f64,
}

impl CasualtySummary {
    pub fn between(initial: &[ArmyStack], remaining: &[ArmyStack]) -> Self {
        let initial = total_count(initial);
        let remaining = total_count(remaining);
        let lost = initial.saturating_sub(remaining);
        Self {
            initial,
            remaining,
            lost,
            loss_ratio: if initial > 0 {
                lost as f64 / initial as f64
            } else {
                0.0
            },
        }
    }
}

/// Structured notification for the outside world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleNotice {
    Victory,
    ArmyAnnihilated,
    Retreated,
}

impl BattleNotice {
    pub fn message(&self) -> &'static str {
        match self {
            BattleNotice::Victory => "Victory!",
            BattleNotice::ArmyAnnihilated => "Army annihilated.",
            BattleNotice::Retreated => "You fled the battlefield.",
        }
    }
}

/// Everything the roster and territory systems need after a battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub battle_type: BattleType,
    pub territory_id: String,
    /// Player roster to persist
    pub roster: Vec<ArmyStack>,
    /// Messages for display: territory results, then looted items
    pub loot: Vec<String>,
    /// Item names awarded
    pub items: Vec<String>,
    pub player_casualties: CasualtySummary,
    pub enemy_casualties: CasualtySummary,
    pub notice: BattleNotice,
    pub rounds: u32,
    pub log: Vec<CombatLogEntry>,
}
