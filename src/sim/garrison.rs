//! Garrison synthesis: table-driven defending armies per faction and tier

use rand::Rng;

use crate::army::{ArmyStack, StackIdAllocator, total_count};
use crate::factions::{FactionId, TerritoryTier};
use crate::factions::TerritoryTier::{Dominion, Established, Stronghold, Unclaimed};
use crate::units::UnitRegistry;

/// One line of a faction's garrison mix
#[derive(Debug, Clone, Copy)]
struct GarrisonRow {
    unit: &'static str,
    /// Units per point of scale
    ratio: f64,
    min_tier: TerritoryTier,
}

const fn row(unit: &'static str, ratio: f64, min_tier: TerritoryTier) -> GarrisonRow {
    GarrisonRow {
        unit,
        ratio,
        min_tier,
    }
}

const PEASANT_ROWS: &[GarrisonRow] = &[
    row("peasant_militia", 100.0, Unclaimed),
    row("town_guard", 40.0, Established),
    row("battle_priest", 10.0, Stronghold),
];

const CHURCH_ROWS: &[GarrisonRow] = &[
    row("crusader", 25.0, Unclaimed),
    row("battle_priest", 15.0, Unclaimed),
    row("crossbowman", 50.0, Unclaimed),
    row("inquisitor", 10.0, Stronghold),
    row("witch_hunter", 5.0, Stronghold),
    row("witch_hunter", 15.0, Dominion),
    row("seraphim", 0.1, Dominion),
];

const MERCHANT_ROWS: &[GarrisonRow] = &[
    row("town_guard", 80.0, Unclaimed),
    row("crossbowman", 60.0, Unclaimed),
    row("crusader", 10.0, Stronghold),
    row("bombard_cannon", 2.0, Dominion),
];

const HUNTER_ROWS: &[GarrisonRow] = &[
    row("witch_hunter", 10.0, Unclaimed),
    row("crossbowman", 80.0, Unclaimed),
    row("inquisitor", 30.0, Unclaimed),
    row("witch_hunter", 20.0, Stronghold),
    row("vampire_hunter", 1.0, Dominion),
    row("seraphim", 0.1, Dominion),
];

const VAMPIRE_ROWS: &[GarrisonRow] = &[
    row("zombie", 50.0, Unclaimed),
    row("skeleton_warrior", 50.0, Unclaimed),
    row("spectre", 20.0, Established),
    row("blood_knight", 10.0, Established),
    row("lich", 5.0, Stronghold),
    row("sanguine_lord", 3.0, Stronghold),
    row("bone_dragon", 0.2, Dominion),
];

fn rows_for(faction: FactionId) -> &'static [GarrisonRow] {
    match faction {
        FactionId::PeasantVillages => PEASANT_ROWS,
        FactionId::ChurchInquisition => CHURCH_ROWS,
        FactionId::MerchantGuild => MERCHANT_ROWS,
        FactionId::VampireHunters => HUNTER_ROWS,
        FactionId::Player
        | FactionId::HouseDracul
        | FactionId::HouseLilitu
        | FactionId::HouseNecros => VAMPIRE_ROWS,
    }
}

/// Build the defending army of a territory.
///
/// Deterministic for a given faction, tier and rng state. Rows whose unit is
/// missing from `registry` or whose count rounds to zero are skipped.
pub fn generate_enemy_garrison<R: Rng + ?Sized>(
    faction: FactionId,
    tier: TerritoryTier,
    registry: &UnitRegistry,
    ids: &mut StackIdAllocator,
    rng: &mut R,
) -> Vec<ArmyStack> {
    let scale = tier.garrison_multiplier() * (0.8 + rng.random::<f64>() * 0.4);

    let garrison: Vec<ArmyStack> = rows_for(faction)
        .iter()
        .filter(|r| tier >= r.min_tier)
        .filter_map(|r| {
            let count = (r.ratio * scale).floor() as u32;
            if count == 0 {
                return None;
            }
            let def = registry.get(r.unit)?;
            Some(ArmyStack::new(ids.next_id(), r.unit, count, def.base.hp))
        })
        .collect();

    log::debug!(
        "Garrison for {:?} tier {}: {} stacks, {} units (scale {:.1})",
        faction,
        tier.level(),
        garrison.len(),
        total_count(&garrison),
        scale
    );

    garrison
}
