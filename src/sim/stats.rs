//! Stat engine: effective combat stats of a stack within its army
//!
//! Pure functions only. Specials and composition synergies add onto a 1.0
//! multiplier per stat; the swarm penalty only touches damage.

use crate::army::ArmyStack;
use crate::consts::{MITIGATION_DIVISOR, SWARM_CAP, SWARM_EXPONENT};
use crate::units::{UnitDef, UnitFamily, UnitRegistry, UnitSpecial};

/// Skeleton count above which dragons and liches get Bone Shield
const BONE_SHIELD_THRESHOLD: u32 = 50;
/// Phantom count above which nobles get Night Cover
const NIGHT_COVER_THRESHOLD: u32 = 10;

/// Effective stats of one stack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackStats {
    pub damage: f64,
    pub hp: f64,
    pub speed: f64,
    pub defense: f64,
    /// Labels of every modifier that applied (for display)
    pub synergies: Vec<&'static str>,
    /// Attacker heals from the damage it deals
    pub lifesteal: bool,
}

#[derive(Debug, Clone, Copy)]
struct Modifiers {
    damage: f64,
    hp: f64,
    speed: f64,
    defense: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            damage: 1.0,
            hp: 1.0,
            speed: 1.0,
            defense: 1.0,
        }
    }
}

/// Count used for damage: linear up to the swarm cap, `excess^0.8` beyond
pub fn effective_count(count: u32) -> f64 {
    let count = count as f64;
    if count > SWARM_CAP {
        SWARM_CAP + (count - SWARM_CAP).powf(SWARM_EXPONENT)
    } else {
        count
    }
}

/// Damage-reduction divisor for a defense rating
pub fn mitigation(defense: f64) -> f64 {
    1.0 + defense / MITIGATION_DIVISOR
}

/// Compute effective stats for `stack` given the army it fights in.
///
/// Unknown definitions (and unknown stacks in `army`) contribute nothing.
pub fn stack_stats(stack: &ArmyStack, army: &[ArmyStack], registry: &UnitRegistry) -> StackStats {
    let Some(def) = registry.get(&stack.def_id) else {
        return StackStats::default();
    };

    let mut mods = Modifiers::default();
    let mut synergies = Vec::new();

    apply_special(def, &mut mods, &mut synergies);
    apply_synergies(def, army, registry, &mut mods, &mut synergies);

    StackStats {
        damage: def.base.damage * effective_count(stack.count) * mods.damage,
        hp: stack.total_hp * mods.hp,
        speed: def.base.speed * mods.speed,
        defense: def.base.defense * mods.defense,
        synergies,
        lifesteal: def.special == UnitSpecial::Lifesteal,
    }
}

fn apply_special(def: &UnitDef, mods: &mut Modifiers, synergies: &mut Vec<&'static str>) {
    match def.special {
        // Dodge folded into effective HP so this layer stays free of rng
        UnitSpecial::Evasion => {
            mods.hp += 0.5;
            synergies.push("Evasion (50%)");
        }
        UnitSpecial::Flying => {
            mods.hp += 0.2;
            mods.speed += 0.2;
            synergies.push("Flying");
        }
        UnitSpecial::Regeneration => {
            mods.hp += 0.3;
            synergies.push("Regen");
        }
        UnitSpecial::Lifesteal => {
            mods.hp += 0.4;
            synergies.push("Lifesteal");
        }
        UnitSpecial::LastStand => {
            mods.defense += 2.0;
            synergies.push("Last Stand");
        }
        UnitSpecial::Survivor => {
            mods.defense += 2.0;
            synergies.push("Undying");
        }
        UnitSpecial::Leader => {
            mods.damage += 1.0;
            mods.hp += 2.0;
            synergies.push("Dark Lord");
        }
        _ => {}
    }
}

fn apply_synergies(
    def: &UnitDef,
    army: &[ArmyStack],
    registry: &UnitRegistry,
    mods: &mut Modifiers,
    synergies: &mut Vec<&'static str>,
) {
    let has_family = |family: UnitFamily, more_than: u32| {
        army.iter().any(|s| {
            s.count > more_than
                && registry
                    .get(&s.def_id)
                    .is_some_and(|d| d.family == family)
        })
    };

    if matches!(def.family, UnitFamily::Dragon | UnitFamily::Lich)
        && has_family(UnitFamily::Skeleton, BONE_SHIELD_THRESHOLD)
    {
        mods.defense += 0.3;
        synergies.push("Bone Shield");
    }

    if def.family == UnitFamily::Corpse && has_family(UnitFamily::Lich, 0) {
        mods.speed += 0.2;
        mods.damage += 0.2;
        synergies.push("Necrotic Frenzy");
    }

    if def.family == UnitFamily::Noble && has_family(UnitFamily::Phantom, NIGHT_COVER_THRESHOLD) {
        mods.defense += 0.2;
        synergies.push("Night Cover");
    }

    let has_leader = army
        .iter()
        .any(|s| s.count > 0 && registry.get(&s.def_id).is_some_and(UnitDef::is_leader));
    if has_leader && !def.is_leader() {
        mods.damage += 0.15;
        mods.defense += 0.15;
        synergies.push("Lord's Command");
    }
}

/// Heuristic combat value of a whole army, for previews and tiebreaks
pub fn army_power(army: &[ArmyStack], registry: &UnitRegistry) -> f64 {
    army.iter()
        .map(|stack| {
            let stats = stack_stats(stack, army, registry);
            stats.damage * 1.5 + (stats.hp / 5.0) * mitigation(stats.defense)
        })
        .sum::<f64>()
        .floor()
}

/// Remaining HP as a percentage of the stack's full pool
pub fn stack_health_percent(stack: &ArmyStack, registry: &UnitRegistry) -> f64 {
    let Some(def) = registry.get(&stack.def_id) else {
        return 0.0;
    };
    let max_hp = def.base.hp * stack.count as f64;
    if max_hp <= 0.0 {
        return 0.0;
    }
    (stack.total_hp / max_hp * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::army::StackId;
    use proptest::prelude::*;

    fn stack(registry: &UnitRegistry, id: u64, def: &str, count: u32) -> ArmyStack {
        ArmyStack::from_registry(StackId(id), def, count, registry).unwrap()
    }

    #[test]
    fn test_plain_stack_uses_base_stats() {
        let registry = UnitRegistry::standard();
        let zombies = stack(&registry, 1, "zombie", 100);
        let stats = stack_stats(&zombies, std::slice::from_ref(&zombies), &registry);
        assert_eq!(stats.damage, 200.0);
        assert_eq!(stats.hp, 1800.0);
        assert_eq!(stats.speed, 2.0);
        assert_eq!(stats.defense, 2.0);
        assert!(stats.synergies.is_empty());
    }

    #[test]
    fn test_unknown_definition_is_inert() {
        let registry = UnitRegistry::standard();
        let ghost = ArmyStack::new(StackId(1), "not_a_unit", 10, 5.0);
        assert_eq!(stack_stats(&ghost, &[], &registry), StackStats::default());
        assert_eq!(stack_health_percent(&ghost, &registry), 0.0);
    }

    #[test]
    fn test_evasion_multiplies_effective_hp() {
        let registry = UnitRegistry::standard();
        let spectres = stack(&registry, 1, "spectre", 10);
        let stats = stack_stats(&spectres, std::slice::from_ref(&spectres), &registry);
        assert_eq!(stats.hp, 150.0 * 1.5);
        assert_eq!(stats.synergies, vec!["Evasion (50%)"]);
    }

    #[test]
    fn test_bone_shield_needs_more_than_fifty_skeletons() {
        let registry = UnitRegistry::standard();
        let dragon = stack(&registry, 1, "bone_dragon", 1);

        let few = vec![dragon.clone(), stack(&registry, 2, "skeleton_warrior", 50)];
        let stats = stack_stats(&dragon, &few, &registry);
        assert!(!stats.synergies.contains(&"Bone Shield"));

        let many = vec![dragon.clone(), stack(&registry, 2, "skeleton_warrior", 51)];
        let stats = stack_stats(&dragon, &many, &registry);
        assert!(stats.synergies.contains(&"Bone Shield"));
        // Last Stand (+2.0) and Bone Shield (+0.3)
        assert!((stats.defense - 20.0 * 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_necrotic_frenzy_and_leader_bonus() {
        let registry = UnitRegistry::standard();
        let zombies = stack(&registry, 1, "zombie", 10);
        let army = vec![
            zombies.clone(),
            stack(&registry, 2, "lich", 1),
            stack(&registry, 3, "vampire_lord_hero", 1),
        ];
        let stats = stack_stats(&zombies, &army, &registry);
        assert!(stats.synergies.contains(&"Necrotic Frenzy"));
        assert!(stats.synergies.contains(&"Lord's Command"));
        // 1.0 + 0.2 frenzy + 0.15 command
        assert!((stats.damage - 2.0 * 10.0 * 1.35).abs() < 1e-9);
        assert!((stats.speed - 2.0 * 1.2).abs() < 1e-9);

        let lord = &army[2];
        let lord_stats = stack_stats(lord, &army, &registry);
        assert!(lord_stats.synergies.contains(&"Dark Lord"));
        assert!(!lord_stats.synergies.contains(&"Lord's Command"));
    }

    #[test]
    fn test_night_cover() {
        let registry = UnitRegistry::standard();
        let knights = stack(&registry, 1, "blood_knight", 5);
        let army = vec![knights.clone(), stack(&registry, 2, "banshee", 11)];
        let stats = stack_stats(&knights, &army, &registry);
        assert!(stats.synergies.contains(&"Night Cover"));
        assert!(stats.lifesteal);
    }

    #[test]
    fn test_swarm_penalty_halves_marginal_gain() {
        let registry = UnitRegistry::standard();
        let small = stack(&registry, 1, "skeleton_warrior", 1000);
        let large = stack(&registry, 2, "skeleton_warrior", 2000);
        let small_dmg = stack_stats(&small, std::slice::from_ref(&small), &registry).damage;
        let large_dmg = stack_stats(&large, std::slice::from_ref(&large), &registry).damage;
        assert!(large_dmg < small_dmg * 2.0);
        // HP is not penalised
        let large_hp = stack_stats(&large, std::slice::from_ref(&large), &registry).hp;
        assert_eq!(large_hp, 2000.0 * 8.0);
    }

    #[test]
    fn test_army_power_and_health_percent() {
        let registry = UnitRegistry::standard();
        let zombies = stack(&registry, 1, "zombie", 100);
        // 200 * 1.5 + (1800 / 5) * 1.1 = 696
        assert_eq!(army_power(std::slice::from_ref(&zombies), &registry), 696.0);

        let mut hurt = zombies.clone();
        hurt.take_damage(900.0, 18.0);
        assert_eq!(stack_health_percent(&hurt, &registry), 100.0);
        hurt.total_hp -= 9.0;
        assert!(stack_health_percent(&hurt, &registry) < 100.0);
    }

    proptest! {
        #[test]
        fn prop_per_unit_damage_falls_past_cap(count in 1001u32..500_000) {
            let lower = effective_count(count) / count as f64;
            let higher = effective_count(count + 1) / (count + 1) as f64;
            prop_assert!(higher < lower);
        }

        #[test]
        fn prop_effective_count_is_linear_under_cap(count in 0u32..=1000) {
            prop_assert_eq!(effective_count(count), count as f64);
        }
    }
}
