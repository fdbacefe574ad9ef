//! CPU-side scene assembly
//!
//! Turns the battlefield into a triangle list in arena pixels (origin top
//! left, y down). The GPU side only maps it to clip space.

use glam::Vec2;

use super::shapes::{circle, faded, line, rect, rect_outline, ring, segments_for, trail};
use super::vertex::{Vertex, colors};
use crate::army::{Side, StackId};
use crate::battle::{BattlePhase, Battlefield, PLAYER_DEPLOY_MIN};
use crate::visual::{ExplosionKind, VisualSim};

/// Side length of a deployment marker in pixels
pub const SQUAD_MARKER_SIZE: f32 = 30.0;
/// Half-size of the drag handle around a marker
pub const SQUAD_GRAB_RADIUS: f32 = 20.0;

/// Maps arena pixels into a viewport, letterboxed to keep the aspect ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub size: Vec2,
    pub arena: Vec2,
}

impl Viewport {
    pub fn new(width: u32, height: u32, arena: Vec2) -> Self {
        Self {
            size: Vec2::new(width.max(1) as f32, height.max(1) as f32),
            arena,
        }
    }

    /// Viewport pixels per arena pixel
    pub fn scale(&self) -> f32 {
        (self.size.x / self.arena.x).min(self.size.y / self.arena.y)
    }

    /// Arena pixels to normalized device coordinates
    pub fn arena_to_ndc(&self, pos: Vec2) -> Vec2 {
        let centered = (pos - self.arena / 2.0) * self.scale();
        Vec2::new(centered.x / (self.size.x / 2.0), -centered.y / (self.size.y / 2.0))
    }

    /// Viewport pixels (e.g. a pointer position) to arena pixels
    pub fn screen_to_arena(&self, screen: Vec2) -> Vec2 {
        (screen - self.size / 2.0) / self.scale() + self.arena / 2.0
    }
}

/// Build the full frame for the current battle state.
///
/// `selected` highlights a deployment marker being dragged.
pub fn build_frame(field: &Battlefield, selected: Option<StackId>) -> Vec<Vertex> {
    let Some(session) = field.session() else {
        return Vec::new();
    };
    let visual = field.visual();

    match session.phase {
        BattlePhase::Deployment => {
            let mut vertices = deployment_zone(visual.width, visual.height);
            for (army, side) in [(&session.player, Side::Player), (&session.enemy, Side::Enemy)] {
                let color = visual.colors.of(side);
                for stack in army.iter() {
                    let Some(pos) = session.position(stack.id) else {
                        continue;
                    };
                    let center = pos * Vec2::new(visual.width, visual.height);
                    let width = if selected == Some(stack.id) { 3.0 } else { 1.0 };
                    vertices.extend(squad_marker(center, color, width));
                }
            }
            vertices
        }
        BattlePhase::Combat | BattlePhase::Results => battle_scene(visual, field.settings().trails),
    }
}

fn deployment_zone(width: f32, height: f32) -> Vec<Vertex> {
    let top = height * PLAYER_DEPLOY_MIN.y;
    let mut vertices = rect(Vec2::new(0.0, top), Vec2::new(width, height), colors::DEPLOY_ZONE);

    // Dashed boundary, 5 px on and 5 px off
    let mut x = 0.0;
    while x < width {
        let end = (x + 5.0).min(width);
        vertices.extend(line(Vec2::new(x, top), Vec2::new(end, top), 2.0, colors::DEPLOY_LINE));
        x += 10.0;
    }
    vertices
}

fn squad_marker(center: Vec2, color: [f32; 4], outline: f32) -> Vec<Vertex> {
    let half = Vec2::splat(SQUAD_MARKER_SIZE / 2.0);
    let mut vertices = rect(center - half, center + half, colors::SQUAD_FILL);
    vertices.extend(rect_outline(center, SQUAD_MARKER_SIZE, outline, color));
    vertices
}

/// Particles and effects, back to front
pub fn battle_scene(visual: &VisualSim, trails: bool) -> Vec<Vertex> {
    let mut vertices = Vec::new();

    for p in visual.particles.iter().filter(|p| p.dead) {
        vertices.extend(circle(p.pos, p.radius, colors::CORPSE, 6));
    }

    for p in visual.particles.iter().filter(|p| !p.dead) {
        let base = visual.colors.of(p.side);
        // Wounds dim toward half brightness
        let shade = 0.5 + 0.5 * p.health_fraction();
        let color = [base[0] * shade, base[1] * shade, base[2] * shade, base[3]];
        vertices.extend(circle(p.pos, p.radius, color, 6));
        if p.flying {
            vertices.extend(ring(p.pos, p.radius, p.radius + 1.0, colors::FLYING_RING, 8));
        }
    }

    let fx = &visual.effects;
    for b in &fx.breath {
        vertices.extend(circle(b.pos, b.size, faded(b.color, b.life * 0.6), segments_for(b.size)));
    }

    for ex in &fx.explosions {
        let color = faded(ex.color, ex.life);
        let segments = segments_for(ex.radius);
        match ex.kind {
            ExplosionKind::Ring => {
                vertices.extend(ring(ex.pos, (ex.radius - 1.0).max(0.0), ex.radius + 1.0, color, segments))
            }
            ExplosionKind::Flash | ExplosionKind::Cloud => {
                vertices.extend(circle(ex.pos, ex.radius, color, segments))
            }
        }
    }

    for proj in &fx.projectiles {
        if trails {
            vertices.extend(trail(&proj.history, 1.0, faded(proj.color, 0.5)));
        }
        vertices.extend(circle(proj.pos, proj.size, proj.color, segments_for(proj.size)));
    }

    for beam in &fx.beams {
        vertices.extend(line(beam.from, beam.to, beam.width * beam.life, faded(beam.color, beam.life)));
    }

    for g in &fx.gore {
        vertices.extend(rect(g.pos, g.pos + Vec2::splat(2.0), faded(g.color, g.life)));
    }

    vertices
}
