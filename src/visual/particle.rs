//! Particles: sampled stand-ins for the units of a stack

use std::collections::HashMap;

use glam::Vec2;
use rand::Rng;

use crate::army::{ArmyStack, Side, StackId, total_count};
use crate::consts::FORMATION_GAP;
use crate::units::{AttackSignature, CombatRole, UnitDef, UnitRegistry};

/// One rendered combatant
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: u32,
    pub stack: StackId,
    pub side: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub role: CombatRole,
    pub signature: AttackSignature,
    pub flying: bool,
    /// Kites at range instead of closing to melee
    pub kites: bool,
    pub range: f32,
    pub cooldown: f32,
    pub max_cooldown: f32,
    pub speed_factor: f32,
    /// Visual-only health; never reaches zero
    pub hp: f32,
    pub max_hp: f32,
    pub dead: bool,
}

impl Particle {
    /// Remaining visual health in `0.1..=1.0`
    pub fn health_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            self.hp / self.max_hp
        } else {
            1.0
        }
    }

    /// Top speed after damping, never below 2 px per frame
    pub fn max_velocity(&self) -> f32 {
        (self.speed_factor * 15.0).max(2.0)
    }
}

/// Radius by unit toughness
pub fn particle_radius(unit_hp: f64) -> f32 {
    if unit_hp > 100.0 {
        2.5
    } else if unit_hp > 40.0 {
        1.8
    } else {
        1.2
    }
}

/// Engagement distance for a unit
pub fn attack_range(def: &UnitDef) -> f32 {
    if matches!(def.signature, AttackSignature::Breath(_)) {
        return 180.0;
    }
    match def.role {
        CombatRole::Melee => 20.0,
        CombatRole::Ranged => 300.0,
        CombatRole::Magic => 250.0,
    }
}

/// How many particles each side gets and how they are laid out
#[derive(Debug, Clone, Copy)]
pub struct SeedLayout {
    pub max_per_side: usize,
    /// Fallback anchor when a stack has no deployment position
    pub fallback: Vec2,
}

/// Sample an army into particles.
///
/// Each stack becomes `ceil(count * ratio)` particles in a centered
/// formation, where `ratio` shrinks the army to the per-side cap. The
/// total never exceeds `layout.max_per_side`.
pub fn seed_side<R: Rng + ?Sized>(
    army: &[ArmyStack],
    side: Side,
    positions: &HashMap<StackId, Vec2>,
    layout: SeedLayout,
    registry: &UnitRegistry,
    next_id: &mut u32,
    rng: &mut R,
) -> Vec<Particle> {
    let total_units = total_count(army);
    let cap = layout.max_per_side as u64;
    let ratio = if total_units > cap && total_units > 0 {
        cap as f64 / total_units as f64
    } else {
        1.0
    };

    let mut particles = Vec::new();
    for stack in army {
        let Some(def) = registry.get(&stack.def_id) else {
            continue;
        };
        let budget = layout.max_per_side.saturating_sub(particles.len());
        let visual_count = ((stack.count as f64 * ratio).ceil() as usize).min(budget);
        if visual_count == 0 {
            continue;
        }

        let start = positions.get(&stack.id).copied().unwrap_or(layout.fallback);
        let cols = ((visual_count as f32 * 3.0).sqrt().ceil() as usize).max(1);
        let rows = visual_count.div_ceil(cols);
        let half = Vec2::new(cols as f32, rows as f32) * FORMATION_GAP / 2.0;

        let radius = particle_radius(def.base.hp);
        let range = attack_range(def);
        let speed_factor = def.base.speed as f32 * 0.04;
        let max_hp = def.base.hp as f32;

        for i in 0..visual_count {
            let cell = Vec2::new((i % cols) as f32, (i / cols) as f32);
            let jitter = Vec2::new(rng.random_range(0.0..4.0), rng.random_range(0.0..4.0));

            particles.push(Particle {
                id: *next_id,
                stack: stack.id,
                side,
                pos: start + cell * FORMATION_GAP - half + jitter,
                vel: Vec2::ZERO,
                radius,
                role: def.role,
                signature: def.signature,
                flying: def.flying,
                kites: def.kites(),
                range,
                cooldown: rng.random_range(0.0..100.0),
                max_cooldown: 100.0 + rng.random_range(0.0..50.0),
                speed_factor,
                hp: max_hp,
                max_hp,
                dead: false,
            });
            *next_id += 1;
        }
    }
    particles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn layout(max_per_side: usize) -> SeedLayout {
        SeedLayout {
            max_per_side,
            fallback: Vec2::new(400.0, 550.0),
        }
    }

    #[test]
    fn test_small_army_is_one_to_one() {
        let registry = UnitRegistry::standard();
        let army = vec![
            ArmyStack::from_registry(StackId(1), "zombie", 30, &registry).unwrap(),
            ArmyStack::from_registry(StackId(2), "lich", 2, &registry).unwrap(),
        ];
        let mut rng = Pcg32::seed_from_u64(1);
        let mut next_id = 0;
        let particles = seed_side(&army, Side::Player, &HashMap::new(), layout(2500), &registry, &mut next_id, &mut rng);
        assert_eq!(particles.len(), 32);
        assert_eq!(next_id, 32);
        assert_eq!(particles.iter().filter(|p| p.stack == StackId(2)).count(), 2);
        let lich = particles.iter().find(|p| p.stack == StackId(2)).unwrap();
        assert_eq!(lich.role, CombatRole::Magic);
        assert_eq!(lich.range, 250.0);
        assert!(lich.kites);
    }

    #[test]
    fn test_huge_army_is_capped() {
        let registry = UnitRegistry::standard();
        let army = vec![
            ArmyStack::from_registry(StackId(1), "peasant_militia", 50_000, &registry).unwrap(),
            ArmyStack::from_registry(StackId(2), "crossbowman", 7, &registry).unwrap(),
        ];
        let mut rng = Pcg32::seed_from_u64(2);
        let mut next_id = 0;
        let particles = seed_side(&army, Side::Enemy, &HashMap::new(), layout(2500), &registry, &mut next_id, &mut rng);
        assert!(particles.len() <= 2500);
        // Small stacks still get at least one particle when budget remains
        assert!(particles.len() >= 2499);
    }

    #[test]
    fn test_formation_centers_on_deployment() {
        let registry = UnitRegistry::standard();
        let army = vec![ArmyStack::from_registry(StackId(5), "skeleton_warrior", 300, &registry).unwrap()];
        let positions = HashMap::from([(StackId(5), Vec2::new(200.0, 400.0))]);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut next_id = 0;
        let particles = seed_side(&army, Side::Player, &positions, layout(2500), &registry, &mut next_id, &mut rng);
        let center = particles.iter().map(|p| p.pos).sum::<Vec2>() / particles.len() as f32;
        assert!(center.distance(Vec2::new(200.0, 400.0)) < 10.0);
    }

    #[test]
    fn test_radius_and_range_tables() {
        let registry = UnitRegistry::standard();
        assert_eq!(particle_radius(150.0), 2.5);
        assert_eq!(particle_radius(41.0), 1.8);
        assert_eq!(particle_radius(40.0), 1.2);
        let dragon = registry.get("bone_dragon").unwrap();
        assert_eq!(attack_range(dragon), 180.0);
        let archer = registry.get("crossbowman").unwrap();
        assert_eq!(attack_range(archer), 300.0);
    }
}
