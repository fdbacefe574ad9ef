//! The visual battle: steering, spectacle attacks and death sync
//!
//! Runs one fixed frame per `step`. It reads the interpolated armies the
//! timeline publishes and never writes back; outcome authority stays with
//! the resolver.

use std::collections::HashMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effects::{
    BLIGHT_COLOR, Beam, BreathParticle, Effects, Explosion, ExplosionKind, Gore, HOLY_COLOR,
    Projectile, VOID_COLOR,
};
use super::grid::SpatialGrid;
use super::particle::{Particle, SeedLayout, seed_side};
use crate::army::{ArmyStack, Side, StackId};
use crate::consts::{ARENA_MARGIN, FLUID_PRESSURE, GRID_CELL, TIME_SCALE, VELOCITY_DAMPING};
use crate::factions::hex_color;
use crate::settings::Settings;
use crate::units::{AttackSignature, BreathColor, CombatRole, UnitRegistry};

/// Debris thrown per dying particle
const GORE_PER_DEATH: usize = 3;
/// Wounds never drop a particle below this share of its health
const WOUND_FLOOR: f32 = 0.1;
/// Share of max visual health removed per hit
const WOUND_PER_HIT: f32 = 0.15;
/// Smite only lands at arm's reach
const SMITE_REACH: f32 = 30.0;
/// Shake below this snaps to zero
const SHAKE_CUTOFF: f32 = 0.5;

const PLAYER_BEAM: u32 = 0xa855f7;
const ENEMY_BEAM: u32 = 0xfbbf24;
const PLAYER_RING: u32 = 0xd8b4fe;
const ENEMY_RING: u32 = 0xfcd34d;

/// Per-side tint and seeding inputs
#[derive(Debug, Clone, Copy)]
pub struct TeamColors {
    pub player: [f32; 4],
    pub enemy: [f32; 4],
}

impl TeamColors {
    pub fn of(&self, side: Side) -> [f32; 4] {
        match side {
            Side::Player => self.player,
            Side::Enemy => self.enemy,
        }
    }
}

/// What a particle decided during steering
struct Decision {
    target: Option<usize>,
    distance: f32,
    force: Vec2,
}

/// Particle battle state
#[derive(Debug)]
pub struct VisualSim {
    pub width: f32,
    pub height: f32,
    pub particles: Vec<Particle>,
    pub effects: Effects,
    /// Accumulated shake intensity in pixels
    pub shake: f32,
    /// Render offset for the current frame
    pub shake_offset: Vec2,
    pub colors: TeamColors,
    /// Last observed count per stack
    snapshot: HashMap<StackId, u32>,
    grid: SpatialGrid,
    rng: Pcg32,
    next_id: u32,
    max_per_side: usize,
    debris: bool,
    shake_enabled: bool,
    frames: u64,
}

impl VisualSim {
    pub fn new(width: f32, height: f32, colors: TeamColors, seed: u64) -> Self {
        Self {
            width,
            height,
            particles: Vec::new(),
            effects: Effects::default(),
            shake: 0.0,
            shake_offset: Vec2::ZERO,
            colors,
            snapshot: HashMap::new(),
            grid: SpatialGrid::new(GRID_CELL),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 0,
            max_per_side: crate::consts::MAX_PARTICLES_PER_SIDE,
            debris: true,
            shake_enabled: true,
            frames: 0,
        }
    }

    /// Apply view settings. Takes effect at the next seed for the particle cap.
    pub fn configure(&mut self, settings: &Settings) {
        self.max_per_side = settings.max_particles_per_side();
        self.debris = settings.debris;
        self.shake_enabled = settings.effective_screen_shake();
        if !self.shake_enabled {
            self.shake = 0.0;
            self.shake_offset = Vec2::ZERO;
        }
    }

    /// Drop every particle and effect
    pub fn clear(&mut self) {
        self.particles.clear();
        self.effects.clear();
        self.snapshot.clear();
        self.grid.clear();
        self.shake = 0.0;
        self.shake_offset = Vec2::ZERO;
        self.frames = 0;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Rebuild the particle pool from both armies.
    ///
    /// `positions` are normalized deployment coordinates per stack.
    pub fn seed(
        &mut self,
        player: &[ArmyStack],
        enemy: &[ArmyStack],
        positions: &HashMap<StackId, Vec2>,
        registry: &UnitRegistry,
    ) {
        self.clear();
        let size = Vec2::new(self.width, self.height);
        let pixels: HashMap<StackId, Vec2> = positions.iter().map(|(id, p)| (*id, *p * size)).collect();

        for (army, side) in [(player, Side::Player), (enemy, Side::Enemy)] {
            let fallback = match side {
                Side::Player => Vec2::new(self.width / 2.0, self.height - 50.0),
                Side::Enemy => Vec2::new(self.width / 2.0, 50.0),
            };
            let layout = SeedLayout {
                max_per_side: self.max_per_side,
                fallback,
            };
            let seeded = seed_side(army, side, &pixels, layout, registry, &mut self.next_id, &mut self.rng);
            log::debug!("Seeded {} {:?} particles for {} stacks", seeded.len(), side, army.len());
            self.particles.extend(seeded);

            self.snapshot.extend(army.iter().map(|s| (s.id, s.count)));
        }
    }

    pub fn live_count(&self, side: Side) -> usize {
        self.particles.iter().filter(|p| p.side == side && !p.dead).count()
    }

    pub fn live_in_stack(&self, stack: StackId) -> usize {
        self.particles.iter().filter(|p| p.stack == stack && !p.dead).count()
    }

    /// Kill particles to follow logical losses since the last sync.
    ///
    /// A stack missing from `current` counts as wiped out. Returns the
    /// number of particles killed.
    pub fn sync_deaths(&mut self, side: Side, current: &[ArmyStack]) -> usize {
        let tracked: Vec<StackId> = self
            .particles
            .iter()
            .filter(|p| p.side == side)
            .map(|p| p.stack)
            .fold(Vec::new(), |mut ids, id| {
                if !ids.contains(&id) {
                    ids.push(id);
                }
                ids
            });

        let mut killed = 0;
        for stack in tracked {
            let now = current.iter().find(|s| s.id == stack).map_or(0, |s| s.count);
            let Some(before) = self.snapshot.get(&stack).copied() else {
                continue;
            };
            if now >= before || before == 0 {
                continue;
            }

            killed += self.kill_fraction(side, stack, before - now, before);
            self.snapshot.insert(stack, now);
        }
        killed
    }

    /// Kill `ceil(live * lost / before)` random live particles of a stack
    fn kill_fraction(&mut self, side: Side, stack: StackId, lost: u32, before: u32) -> usize {
        let mut live: Vec<usize> = self
            .particles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.stack == stack && !p.dead)
            .map(|(i, _)| i)
            .collect();

        let wanted = (live.len() as u64 * lost as u64).div_ceil(before as u64) as usize;
        let to_kill = wanted.min(live.len());
        if wanted > live.len() {
            log::warn!("Stack {} wanted {} deaths with {} particles left", stack, wanted, live.len());
        }

        let color = self.colors.of(side);
        for _ in 0..to_kill {
            let pick = self.rng.random_range(0..live.len());
            let victim = live.swap_remove(pick);
            let particle = &mut self.particles[victim];
            particle.dead = true;
            particle.vel = Vec2::ZERO;

            if self.debris {
                let at = particle.pos;
                for _ in 0..GORE_PER_DEATH {
                    let vel = Vec2::new(self.rng.random::<f32>() - 0.5, self.rng.random::<f32>() - 0.5) * 3.0;
                    self.effects.gore.push(Gore {
                        pos: at,
                        vel,
                        life: 1.0,
                        color,
                    });
                }
            }
        }
        to_kill
    }

    /// Advance one frame: sync deaths, steer, attack, update effects.
    pub fn step(&mut self, player: &[ArmyStack], enemy: &[ArmyStack]) {
        self.sync_deaths(Side::Player, player);
        self.sync_deaths(Side::Enemy, enemy);

        self.update_shake();

        let live: Vec<usize> = (0..self.particles.len()).filter(|&i| !self.particles[i].dead).collect();
        self.grid.rebuild(live.iter().map(|&i| (i, self.particles[i].pos)));

        for &i in &live {
            let decision = self.steer(i);
            if let Some(target) = decision.target {
                self.try_attack(i, target, decision.distance);
            }
            self.integrate(i, decision.force);
        }

        let impact_shake = self.effects.update();
        self.add_shake(impact_shake);
        self.frames += 1;
    }

    fn update_shake(&mut self) {
        if self.shake > 0.0 {
            let jitter = Vec2::new(self.rng.random::<f32>() - 0.5, self.rng.random::<f32>() - 0.5);
            self.shake_offset = jitter * self.shake;
            self.shake *= 0.9;
            if self.shake < SHAKE_CUTOFF {
                self.shake = 0.0;
            }
        } else {
            self.shake_offset = Vec2::ZERO;
        }
    }

    fn add_shake(&mut self, amount: f32) {
        if self.shake_enabled {
            self.shake += amount;
        }
    }

    /// Nearest foe in the 5x5 cell neighborhood
    fn nearest_foe(&self, i: usize) -> Option<(usize, f32)> {
        let p = &self.particles[i];
        let mut best: Option<(usize, f32)> = None;
        for j in self.grid.query_neighborhood(p.pos, 2) {
            let other = &self.particles[j];
            if other.side == p.side || other.dead {
                continue;
            }
            let d = p.pos.distance(other.pos);
            if best.is_none_or(|(_, min)| d < min) {
                best = Some((j, d));
            }
        }
        best
    }

    fn steer(&self, i: usize) -> Decision {
        let p = &self.particles[i];
        let foe = self.nearest_foe(i);

        let anchor = match p.side {
            Side::Player => Vec2::new(self.width / 2.0, 20.0),
            Side::Enemy => Vec2::new(self.width / 2.0, self.height - 20.0),
        };
        let mut seek = foe.map_or(anchor, |(j, _)| self.particles[j].pos);

        if let Some((j, dist)) = foe {
            if p.kites {
                if dist < p.range * 0.4 {
                    let away = (self.particles[j].pos - p.pos).normalize_or_zero();
                    seek = p.pos - away * 100.0;
                } else if dist < p.range {
                    seek = p.pos;
                }
            }
        }

        let mut force = (seek - p.pos).normalize_or_zero() * p.speed_factor;

        // Separation against same-flight neighbors in the own cell
        for &j in self.grid.query_cell(p.pos) {
            if j == i {
                continue;
            }
            let other = &self.particles[j];
            if other.flying != p.flying {
                continue;
            }
            let offset = p.pos - other.pos;
            let dist_sq = offset.length_squared();
            let min_sep = p.radius + other.radius + 1.2;
            if dist_sq > 0.0 && dist_sq < min_sep * min_sep {
                let dist = dist_sq.sqrt();
                force += offset / dist * (min_sep - dist) * FLUID_PRESSURE;
            }
        }

        Decision {
            target: foe.map(|(j, _)| j),
            distance: foe.map_or(f32::MAX, |(_, d)| d),
            force,
        }
    }

    fn try_attack(&mut self, i: usize, target: usize, dist: f32) {
        let p = &mut self.particles[i];
        if dist > p.range {
            return;
        }
        p.cooldown -= TIME_SCALE;
        if p.cooldown > 0.0 {
            return;
        }
        p.cooldown = p.max_cooldown;

        let (from, side, role, signature) = (p.pos, p.side, p.role, p.signature);
        let to = self.particles[target].pos;
        let dir = (to - from).normalize_or_zero();

        match signature {
            AttackSignature::Breath(breath) => {
                self.add_shake(1.5);
                let color = hex_color(
                    match breath {
                        BreathColor::Blight => BLIGHT_COLOR,
                        BreathColor::Void => VOID_COLOR,
                    },
                    1.0,
                );
                let angle = dir.y.atan2(dir.x);
                for _ in 0..12 {
                    let spread = (self.rng.random::<f32>() - 0.5) * 0.5;
                    let speed = 3.0 + self.rng.random::<f32>() * 2.0;
                    let size = 3.0 + self.rng.random::<f32>() * 4.0;
                    self.effects.breath.push(BreathParticle {
                        pos: from,
                        vel: Vec2::from_angle(angle + spread) * speed,
                        life: 1.0,
                        color,
                        size,
                    });
                }
            }
            AttackSignature::Smite if dist < SMITE_REACH => {
                self.add_shake(2.0);
                self.effects.explosions.push(Explosion::new(
                    (from + to) / 2.0,
                    5.0,
                    40.0,
                    hex_color(HOLY_COLOR, 1.0),
                    1.0,
                    ExplosionKind::Flash,
                ));
            }
            AttackSignature::Artillery => {
                self.add_shake(0.5);
                self.effects.projectiles.push(Projectile::shell(from, dir));
            }
            _ => match role {
                CombatRole::Ranged => self.effects.projectiles.push(Projectile::arrow(from, dir)),
                CombatRole::Magic => {
                    let (beam, ring) = match side {
                        Side::Player => (PLAYER_BEAM, PLAYER_RING),
                        Side::Enemy => (ENEMY_BEAM, ENEMY_RING),
                    };
                    self.effects.beams.push(Beam {
                        from,
                        to,
                        color: hex_color(beam, 1.0),
                        life: 1.0,
                        width: 1.5,
                    });
                    self.effects.explosions.push(Explosion::new(
                        to,
                        2.0,
                        15.0,
                        hex_color(ring, 1.0),
                        1.0,
                        ExplosionKind::Ring,
                    ));
                }
                CombatRole::Melee => {}
            },
        }

        let struck = &mut self.particles[target];
        struck.hp = (struck.hp - struck.max_hp * WOUND_PER_HIT).max(struck.max_hp * WOUND_FLOOR);
    }

    fn integrate(&mut self, i: usize, force: Vec2) {
        let (w, h) = (self.width, self.height);
        let p = &mut self.particles[i];
        p.vel = (p.vel + force).clamp_length_max(p.max_velocity());
        p.vel *= VELOCITY_DAMPING;
        p.pos += p.vel * TIME_SCALE;
        p.pos = p.pos.clamp(
            Vec2::splat(ARENA_MARGIN),
            Vec2::new(w - ARENA_MARGIN, h - ARENA_MARGIN),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
    use crate::factions::FactionId;

    fn colors() -> TeamColors {
        TeamColors {
            player: FactionId::Player.color(),
            enemy: FactionId::ChurchInquisition.color(),
        }
    }

    fn sim(seed: u64) -> VisualSim {
        VisualSim::new(ARENA_WIDTH, ARENA_HEIGHT, colors(), seed)
    }

    fn positions(player: &[ArmyStack], enemy: &[ArmyStack]) -> HashMap<StackId, Vec2> {
        let mut map = HashMap::new();
        for (i, s) in player.iter().enumerate() {
            map.insert(s.id, Vec2::new(0.2 + i as f32 * 0.2, 0.7));
        }
        for (i, s) in enemy.iter().enumerate() {
            map.insert(s.id, Vec2::new(0.2 + i as f32 * 0.2, 0.3));
        }
        map
    }

    fn armies(registry: &UnitRegistry) -> (Vec<ArmyStack>, Vec<ArmyStack>) {
        let player = vec![
            ArmyStack::from_registry(StackId(1), "skeleton_warrior", 120, registry).unwrap(),
            ArmyStack::from_registry(StackId(2), "lich", 3, registry).unwrap(),
            ArmyStack::from_registry(StackId(3), "bone_dragon", 1, registry).unwrap(),
        ];
        let enemy = vec![
            ArmyStack::from_registry(StackId(10), "crossbowman", 80, registry).unwrap(),
            ArmyStack::from_registry(StackId(11), "bombard_cannon", 2, registry).unwrap(),
            ArmyStack::from_registry(StackId(12), "seraphim", 1, registry).unwrap(),
        ];
        (player, enemy)
    }

    #[test]
    fn test_capped_stack_never_over_kills() {
        let registry = UnitRegistry::standard();
        let horde = vec![ArmyStack::from_registry(StackId(1), "peasant_militia", 50_000, &registry).unwrap()];
        let mut vis = sim(1);
        vis.seed(&[], &horde, &HashMap::new(), &registry);
        assert_eq!(vis.live_count(Side::Enemy), 2500);

        let mut current = horde.clone();
        let mut total_killed = 0;
        for count in [40_000, 25_000, 24_999, 3, 0] {
            current[0].count = count;
            let killed = vis.sync_deaths(Side::Enemy, &current);
            total_killed += killed;
            assert!(vis.live_count(Side::Enemy) <= 2500);
        }
        assert_eq!(total_killed, 2500);
        assert_eq!(vis.live_count(Side::Enemy), 0);

        // Further losses against an empty pool are a no-op
        current[0].count = 0;
        assert_eq!(vis.sync_deaths(Side::Enemy, &current), 0);
    }

    #[test]
    fn test_uncapped_kills_match_logical_losses() {
        let registry = UnitRegistry::standard();
        let army = vec![ArmyStack::from_registry(StackId(4), "zombie", 200, &registry).unwrap()];
        let mut vis = sim(2);
        vis.seed(&army, &[], &HashMap::new(), &registry);

        let mut current = army.clone();
        for count in [190, 150, 149, 60, 0] {
            let before = current[0].count;
            current[0].count = count;
            let killed = vis.sync_deaths(Side::Player, &current);
            assert_eq!(killed as u32, before - count);
            assert_eq!(vis.live_in_stack(StackId(4)) as u32, count);
        }
    }

    #[test]
    fn test_missing_stack_counts_as_wiped_out() {
        let registry = UnitRegistry::standard();
        let army = vec![ArmyStack::from_registry(StackId(4), "zombie", 20, &registry).unwrap()];
        let mut vis = sim(3);
        vis.seed(&army, &[], &HashMap::new(), &registry);
        assert_eq!(vis.sync_deaths(Side::Player, &[]), 20);
        assert_eq!(vis.effects.gore.len(), 60);
    }

    #[test]
    fn test_determinism() {
        let registry = UnitRegistry::standard();
        let (player, enemy) = armies(&registry);
        let pos = positions(&player, &enemy);

        let run = |seed| {
            let mut vis = sim(seed);
            vis.seed(&player, &enemy, &pos, &registry);
            for _ in 0..300 {
                vis.step(&player, &enemy);
            }
            vis.particles.iter().map(|p| (p.pos, p.hp)).collect::<Vec<_>>()
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn test_particles_stay_in_arena_and_alive() {
        let registry = UnitRegistry::standard();
        let (player, enemy) = armies(&registry);
        let pos = positions(&player, &enemy);
        let mut vis = sim(5);
        vis.seed(&player, &enemy, &pos, &registry);
        let seeded = vis.particles.len();

        for _ in 0..600 {
            vis.step(&player, &enemy);
        }
        // Visual combat alone never kills
        assert_eq!(vis.live_count(Side::Player) + vis.live_count(Side::Enemy), seeded);
        for p in &vis.particles {
            assert!(p.pos.x >= ARENA_MARGIN && p.pos.x <= ARENA_WIDTH - ARENA_MARGIN);
            assert!(p.pos.y >= ARENA_MARGIN && p.pos.y <= ARENA_HEIGHT - ARENA_MARGIN);
            assert!(p.health_fraction() >= WOUND_FLOOR - f32::EPSILON);
        }
    }

    #[test]
    fn test_armies_close_and_fight() {
        let registry = UnitRegistry::standard();
        let (player, enemy) = armies(&registry);
        let pos = positions(&player, &enemy);
        let mut vis = sim(9);
        vis.seed(&player, &enemy, &pos, &registry);

        let mut saw_effects = false;
        for _ in 0..900 {
            vis.step(&player, &enemy);
            saw_effects |= !vis.effects.projectiles.is_empty() || !vis.effects.beams.is_empty();
        }
        assert!(saw_effects);
        assert!(vis.particles.iter().any(|p| p.hp < p.max_hp));
    }

    #[test]
    fn test_reduced_motion_suppresses_shake() {
        let registry = UnitRegistry::standard();
        let (player, enemy) = armies(&registry);
        let pos = positions(&player, &enemy);
        let mut vis = sim(9);
        vis.configure(&Settings {
            reduced_motion: true,
            ..Settings::default()
        });
        vis.seed(&player, &enemy, &pos, &registry);
        for _ in 0..900 {
            vis.step(&player, &enemy);
            assert_eq!(vis.shake, 0.0);
            assert_eq!(vis.shake_offset, Vec2::ZERO);
        }
    }
}
