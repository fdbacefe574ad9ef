//! Deterministic battle logic
//!
//! Everything that decides a battle lives here. This module must stay pure:
//! - Injected RNG only
//! - Stable iteration order
//! - No rendering or platform dependencies

pub mod combat_log;
pub mod garrison;
pub mod resolve;
pub mod stats;

pub use combat_log::{CombatLogEntry, LogKind};
pub use garrison::generate_enemy_garrison;
pub use resolve::{Resolution, RoundSummary, Termination, resolve, resolve_round, resolve_seeded};
pub use stats::{StackStats, army_power, effective_count, mitigation, stack_health_percent, stack_stats};
