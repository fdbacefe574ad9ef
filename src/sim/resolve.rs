//! Resolution engine: speed-ordered combat rounds over cloned armies
//!
//! The outcome of a battle is decided here, once, before anything is drawn.
//! Randomness comes only from the injected generator, so a fixed seed always
//! replays the same battle.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat_log::{CombatLogEntry, LogKind};
use super::stats::{army_power, mitigation, stack_stats};
use crate::army::{ArmyStack, Side, prune_dead, total_count};
use crate::consts::{DAMAGE_ROLL_MAX, DAMAGE_ROLL_MIN, LIFESTEAL_FRACTION, ROUND_CAP};
use crate::error::{BattleError, Result};
use crate::units::UnitRegistry;

/// Why resolution stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// One side was wiped out
    Elimination,
    /// Round cap reached with both sides standing; decided by army power
    RoundCap,
    /// One side had nothing to fight with from the start
    Unopposed,
}

/// Final state of a resolved battle
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub player: Vec<ArmyStack>,
    pub enemy: Vec<ArmyStack>,
    pub winner: Side,
    pub rounds: u32,
    pub termination: Termination,
    pub log: Vec<CombatLogEntry>,
}

/// Per-round damage totals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundSummary {
    pub player_damage: f64,
    pub enemy_damage: f64,
    pub healed: f64,
}

/// Resolve a battle with a generator seeded from `seed`
pub fn resolve_seeded(
    player: &[ArmyStack],
    enemy: &[ArmyStack],
    registry: &UnitRegistry,
    seed: u64,
) -> Result<Resolution> {
    let mut rng = Pcg32::seed_from_u64(seed);
    resolve(player, enemy, registry, &mut rng)
}

/// Resolve a battle between two armies.
///
/// The inputs are cloned; callers keep their originals. Fails only on invalid
/// input: both sides empty, or a stack whose definition is not registered.
pub fn resolve<R: Rng + ?Sized>(
    player: &[ArmyStack],
    enemy: &[ArmyStack],
    registry: &UnitRegistry,
    rng: &mut R,
) -> Result<Resolution> {
    if let Some(unknown) = player
        .iter()
        .chain(enemy)
        .find(|s| !registry.contains(&s.def_id))
    {
        return Err(BattleError::UnknownUnit(unknown.def_id.clone()));
    }

    let mut player = player.to_vec();
    let mut enemy = enemy.to_vec();
    prune_dead(&mut player);
    prune_dead(&mut enemy);

    let mut log = Vec::new();

    match (player.is_empty(), enemy.is_empty()) {
        (true, true) => return Err(BattleError::EmptyArmies),
        (false, true) | (true, false) => {
            let (winner, message) = if enemy.is_empty() {
                (Side::Player, "The enemy never took the field.")
            } else {
                (Side::Enemy, "No forces answered the call to arms.")
            };
            log.push(CombatLogEntry::info(0, message));
            return Ok(Resolution {
                player,
                enemy,
                winner,
                rounds: 0,
                termination: Termination::Unopposed,
                log,
            });
        }
        (false, false) => {}
    }

    let mut rounds = 0;
    while !player.is_empty() && !enemy.is_empty() && rounds < ROUND_CAP {
        rounds += 1;
        resolve_round(&mut player, &mut enemy, registry, rng, rounds, &mut log);
    }

    let (winner, termination) = if enemy.is_empty() {
        (Side::Player, Termination::Elimination)
    } else if player.is_empty() {
        (Side::Enemy, Termination::Elimination)
    } else {
        (round_cap_winner(&player, &enemy, registry), Termination::RoundCap)
    };

    log.push(CombatLogEntry::info(
        rounds,
        match termination {
            Termination::RoundCap => format!("Neither side broke after {rounds} rounds; {winner:?} holds the field."),
            _ => format!("{winner:?} victorious after {rounds} rounds."),
        },
    ));
    log::debug!(
        "Resolved in {} rounds ({:?}): player {} units, enemy {} units, winner {:?}",
        rounds,
        termination,
        total_count(&player),
        total_count(&enemy),
        winner
    );

    Ok(Resolution {
        player,
        enemy,
        winner,
        rounds,
        termination,
        log,
    })
}

/// Stronger remaining army wins; the defender keeps the field on an exact tie
fn round_cap_winner(player: &[ArmyStack], enemy: &[ArmyStack], registry: &UnitRegistry) -> Side {
    if army_power(player, registry) > army_power(enemy, registry) {
        Side::Player
    } else {
        Side::Enemy
    }
}

/// Run one round: every live stack attacks once, fastest first.
///
/// Dead stacks are pruned from both armies afterwards.
pub fn resolve_round<R: Rng + ?Sized>(
    player: &mut Vec<ArmyStack>,
    enemy: &mut Vec<ArmyStack>,
    registry: &UnitRegistry,
    rng: &mut R,
    round: u32,
    log: &mut Vec<CombatLogEntry>,
) -> RoundSummary {
    let mut order: Vec<(Side, usize, f64)> = player
        .iter()
        .enumerate()
        .map(|(i, s)| (Side::Player, i, s))
        .chain(enemy.iter().enumerate().map(|(i, s)| (Side::Enemy, i, s)))
        .filter(|(_, _, s)| s.is_alive())
        .filter_map(|(side, i, s)| registry.get(&s.def_id).map(|d| (side, i, d.base.speed)))
        .collect();
    // Stable: ties keep player-then-enemy army order
    order.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

    let mut summary = RoundSummary::default();

    for (side, index, _) in order {
        let (own, foe) = match side {
            Side::Player => (&mut *player, &mut *enemy),
            Side::Enemy => (&mut *enemy, &mut *player),
        };
        if !own[index].is_alive() {
            continue;
        }

        let targets: Vec<usize> = foe
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_alive())
            .map(|(i, _)| i)
            .collect();
        if targets.is_empty() {
            break;
        }
        let target = targets[rng.random_range(0..targets.len())];

        let attacker_stats = stack_stats(&own[index], own.as_slice(), registry);
        let defender_stats = stack_stats(&foe[target], foe.as_slice(), registry);

        let roll = attacker_stats.damage * rng.random_range(DAMAGE_ROLL_MIN..DAMAGE_ROLL_MAX);
        let final_damage = (roll / mitigation(defender_stats.defense)).floor();

        let Some(target_def) = registry.get(&foe[target].def_id) else {
            continue;
        };
        let dealt = foe[target].take_damage(final_damage, target_def.base.hp);
        match side {
            Side::Player => summary.player_damage += dealt,
            Side::Enemy => summary.enemy_damage += dealt,
        }
        if !foe[target].is_alive() {
            log.push(CombatLogEntry::new(
                round,
                LogKind::Death,
                format!("{:?} {} ({}) was destroyed.", side.opponent(), target_def.name, foe[target].id),
            ));
        }

        if attacker_stats.lifesteal {
            if let Some(attacker_def) = registry.get(&own[index].def_id) {
                let heal = (dealt * LIFESTEAL_FRACTION).floor();
                summary.healed += own[index].heal(heal, attacker_def.base.hp);
            }
        }
    }

    if summary.player_damage > 0.0 || summary.enemy_damage > 0.0 {
        log.push(CombatLogEntry::new(
            round,
            LogKind::Damage,
            format!(
                "Round {}: your forces dealt {:.0}, the enemy dealt {:.0}.",
                round, summary.player_damage, summary.enemy_damage
            ),
        ));
    }
    if summary.healed > 0.0 {
        log.push(CombatLogEntry::new(
            round,
            LogKind::Heal,
            format!("Lifesteal restored {:.0} HP.", summary.healed),
        ));
    }

    prune_dead(player);
    prune_dead(enemy);
    summary
}
