//! Visual battle simulation
//!
//! Dramatizes a battle the resolver already decided. Particles sample each
//! stack, steer toward the nearest foe and fire cosmetic attacks; deaths are
//! driven only by the timeline's interpolated counts.

pub mod effects;
pub mod grid;
pub mod particle;
pub mod sim;

pub use effects::{Beam, BreathParticle, Effects, Explosion, ExplosionKind, Gore, Projectile};
pub use grid::SpatialGrid;
pub use particle::Particle;
pub use sim::{TeamColors, VisualSim};
