//! Animation timeline: march, then a linear engagement from initial to final counts

use crate::army::ArmyStack;
use crate::consts::{ENGAGEMENT_SECONDS, MARCH_SECONDS};
use crate::units::UnitRegistry;

/// Fixed-length clock that drives the visible casualties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    elapsed: f32,
    march: f32,
    engagement: f32,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(MARCH_SECONDS, ENGAGEMENT_SECONDS)
    }
}

impl Timeline {
    pub fn new(march: f32, engagement: f32) -> Self {
        Self {
            elapsed: 0.0,
            march: march.max(0.0),
            engagement: engagement.max(f32::EPSILON),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration());
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.march + self.engagement
    }

    /// Still closing the distance; no casualties yet
    pub fn in_march(&self) -> bool {
        self.elapsed < self.march
    }

    /// Engagement progress in `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        ((self.elapsed - self.march) / self.engagement).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration()
    }
}

/// Visible army at `progress`: every initial stack, with its count moved
/// linearly toward the resolved count. Stacks that died keep a zero entry.
pub fn interpolate_army(
    initial: &[ArmyStack],
    resolved: &[ArmyStack],
    progress: f32,
    registry: &UnitRegistry,
) -> Vec<ArmyStack> {
    let progress = progress.clamp(0.0, 1.0) as f64;
    initial
        .iter()
        .map(|init| {
            let final_count = resolved
                .iter()
                .find(|s| s.id == init.id)
                .map_or(0, |s| s.count);
            let diff = init.count.saturating_sub(final_count) as f64;
            let count = (init.count as f64 - diff * progress).floor().max(0.0) as u32;
            let unit_hp = registry.get(&init.def_id).map_or(1.0, |d| d.base.hp);

            let mut stack = init.clone();
            stack.count = count;
            stack.total_hp = count as f64 * unit_hp;
            stack
        })
        .collect()
}
