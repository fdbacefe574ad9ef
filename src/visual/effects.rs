//! Timed attack effects: projectiles, beams, explosions, breath and debris
//!
//! Every pool advances by one fixed frame per `update` call and prunes
//! itself once lifetimes run out. None of these touch particle state.

use glam::Vec2;

use crate::consts::TIME_SCALE;
use crate::factions::hex_color;

/// Trail points kept per projectile
pub const TRAIL_LENGTH: usize = 5;

pub const ARROW_COLOR: u32 = 0xe5e5e5;
pub const SHELL_COLOR: u32 = 0x1f2937;
pub const FIRE_COLOR: u32 = 0xea580c;
pub const SMOKE_COLOR: u32 = 0x4b5563;
pub const HOLY_COLOR: u32 = 0xfbbf24;
pub const BLIGHT_COLOR: u32 = 0x84cc16;
pub const VOID_COLOR: u32 = 0x7e22ce;

/// Flying shot. Artillery shells burst when their life runs out.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub color: [f32; 4],
    pub size: f32,
    pub explode_on_impact: bool,
    /// Oldest first
    pub history: Vec<Vec2>,
}

impl Projectile {
    pub fn arrow(from: Vec2, dir: Vec2) -> Self {
        Self::new(from, dir * 12.0, 40.0, hex_color(ARROW_COLOR, 1.0), 1.0, false)
    }

    pub fn shell(from: Vec2, dir: Vec2) -> Self {
        Self::new(from, dir * 6.0, 60.0, hex_color(SHELL_COLOR, 1.0), 3.0, true)
    }

    fn new(pos: Vec2, vel: Vec2, life: f32, color: [f32; 4], size: f32, explode_on_impact: bool) -> Self {
        Self {
            pos,
            vel,
            life,
            color,
            size,
            explode_on_impact,
            history: Vec::with_capacity(TRAIL_LENGTH),
        }
    }
}

/// Instant caster link between attacker and target
#[derive(Debug, Clone)]
pub struct Beam {
    pub from: Vec2,
    pub to: Vec2,
    pub color: [f32; 4],
    pub life: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionKind {
    Ring,
    Cloud,
    Flash,
}

/// Expanding circle; radius grows as life drains
#[derive(Debug, Clone)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub color: [f32; 4],
    pub life: f32,
    pub kind: ExplosionKind,
}

impl Explosion {
    pub fn new(pos: Vec2, radius: f32, max_radius: f32, color: [f32; 4], life: f32, kind: ExplosionKind) -> Self {
        Self {
            pos,
            radius,
            max_radius,
            color,
            life,
            kind,
        }
    }
}

/// One puff of a breath cone
#[derive(Debug, Clone)]
pub struct BreathParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub color: [f32; 4],
    pub size: f32,
}

/// Debris thrown off a dying particle
#[derive(Debug, Clone)]
pub struct Gore {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub color: [f32; 4],
}

/// All effect pools of the visual battle
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub projectiles: Vec<Projectile>,
    pub beams: Vec<Beam>,
    pub explosions: Vec<Explosion>,
    pub breath: Vec<BreathParticle>,
    pub gore: Vec<Gore>,
}

impl Effects {
    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.beams.clear();
        self.explosions.clear();
        self.breath.clear();
        self.gore.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
            && self.beams.is_empty()
            && self.explosions.is_empty()
            && self.breath.is_empty()
            && self.gore.is_empty()
    }

    /// Advance every pool by one frame. Returns screen shake added by impacts.
    pub fn update(&mut self) -> f32 {
        let mut shake = 0.0;

        for b in &mut self.breath {
            b.pos += b.vel * TIME_SCALE;
            b.life -= 0.04 * TIME_SCALE;
            b.size += 0.1 * TIME_SCALE;
        }
        self.breath.retain(|b| b.life > 0.0);

        for ex in &mut self.explosions {
            ex.life -= 0.05 * TIME_SCALE;
            ex.radius = ex.max_radius * (1.0 - ex.life);
        }
        self.explosions.retain(|ex| ex.life > 0.0);

        let mut bursts = Vec::new();
        for proj in &mut self.projectiles {
            proj.pos += proj.vel * TIME_SCALE;
            proj.life -= TIME_SCALE;

            if proj.history.len() == TRAIL_LENGTH {
                proj.history.remove(0);
            }
            proj.history.push(proj.pos);

            if proj.life <= 0.0 && proj.explode_on_impact {
                shake += 3.0;
                bursts.push(Explosion::new(proj.pos, 5.0, 30.0, hex_color(FIRE_COLOR, 1.0), 1.0, ExplosionKind::Cloud));
                bursts.push(Explosion::new(proj.pos, 5.0, 20.0, hex_color(SMOKE_COLOR, 1.0), 0.8, ExplosionKind::Cloud));
            }
        }
        self.projectiles.retain(|p| p.life > 0.0);
        self.explosions.extend(bursts);

        for beam in &mut self.beams {
            beam.life -= 0.05 * TIME_SCALE;
        }
        self.beams.retain(|b| b.life > 0.0);

        for g in &mut self.gore {
            g.pos += g.vel * TIME_SCALE;
            g.life -= 0.02 * TIME_SCALE;
        }
        self.gore.retain(|g| g.life > 0.0);

        shake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_bursts_once_on_impact() {
        let mut effects = Effects::default();
        effects.projectiles.push(Projectile::shell(Vec2::ZERO, Vec2::X));

        let mut total_shake = 0.0;
        // 60 life at 0.3 per frame
        for _ in 0..250 {
            total_shake += effects.update();
        }
        assert!(effects.projectiles.is_empty());
        assert_eq!(total_shake, 3.0);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut effects = Effects::default();
        effects.projectiles.push(Projectile::arrow(Vec2::ZERO, Vec2::Y));
        for _ in 0..20 {
            effects.update();
        }
        let arrow = &effects.projectiles[0];
        assert_eq!(arrow.history.len(), TRAIL_LENGTH);
        assert_eq!(*arrow.history.last().unwrap(), arrow.pos);
        assert!(arrow.history[0].y < arrow.pos.y);
    }

    #[test]
    fn test_pools_drain() {
        let mut effects = Effects::default();
        effects.beams.push(Beam {
            from: Vec2::ZERO,
            to: Vec2::ONE,
            color: [1.0; 4],
            life: 1.0,
            width: 1.5,
        });
        effects.gore.push(Gore {
            pos: Vec2::ZERO,
            vel: Vec2::ONE,
            life: 1.0,
            color: [1.0; 4],
        });
        effects.explosions.push(Explosion::new(Vec2::ZERO, 2.0, 15.0, [1.0; 4], 1.0, ExplosionKind::Ring));
        // Gore is the slowest: 1.0 / (0.02 * 0.3) frames
        for _ in 0..200 {
            effects.update();
        }
        assert!(effects.is_empty());
    }
}
