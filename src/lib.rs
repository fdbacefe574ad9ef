//! Warhost - stack-based army battles with a real-time particle view
//!
//! Core modules:
//! - `sim`: Deterministic logical combat (stat engine, resolver, garrisons)
//! - `visual`: Per-frame particle battle that dramatizes a resolved outcome
//! - `battle`: Session orchestration (deployment, timeline, reports)
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Quality presets and visual preferences

pub mod army;
pub mod battle;
pub mod error;
pub mod factions;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod units;
pub mod visual;

pub use army::{ArmyStack, Side, StackId};
pub use battle::{BattleOutcome, BattlePhase, BattleReport, BattleType, Battlefield, WorldHooks};
pub use error::{BattleError, Result};
pub use factions::{FactionId, TerritoryRef, TerritoryTier};
pub use settings::{QualityPreset, Settings};
pub use units::{UnitDef, UnitRegistry};

/// Battle tuning constants
pub mod consts {
    /// Hard cap on resolver rounds
    pub const ROUND_CAP: u32 = 300;
    /// Stack size past which damage contribution scales sub-linearly
    pub const SWARM_CAP: f64 = 1000.0;
    /// Exponent applied to the count above the swarm cap
    pub const SWARM_EXPONENT: f64 = 0.8;
    /// Every 20 defense doubles durability
    pub const MITIGATION_DIVISOR: f64 = 20.0;
    /// Share of damage dealt returned to a lifesteal attacker
    pub const LIFESTEAL_FRACTION: f64 = 0.2;
    /// Damage roll spread
    pub const DAMAGE_ROLL_MIN: f64 = 0.9;
    pub const DAMAGE_ROLL_MAX: f64 = 1.1;

    /// Timeline: armies close the distance before casualties start
    pub const MARCH_SECONDS: f32 = 2.0;
    /// Timeline: casualties interpolate over this span
    pub const ENGAGEMENT_SECONDS: f32 = 25.0;

    /// Fixed visual step (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions in pixels
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Particles keep this far from the arena edge
    pub const ARENA_MARGIN: f32 = 10.0;

    /// Upper bound on sampled particles per side
    pub const MAX_PARTICLES_PER_SIDE: usize = 2500;
    /// Spatial grid cell size
    pub const GRID_CELL: f32 = 50.0;
    /// Per-step motion scale applied to velocities and timers
    pub const TIME_SCALE: f32 = 0.3;
    pub const FORMATION_GAP: f32 = 3.5;
    /// Separation strength between overlapping particles
    pub const FLUID_PRESSURE: f32 = 0.6;
    pub const VELOCITY_DAMPING: f32 = 0.9;
}
