//! Army stacks: groups of identical units sharing one HP pool

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::UnitRegistry;

/// Stable identifier of a stack across a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StackId(pub u64);

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out stack ids that cannot collide with an existing roster
#[derive(Debug, Clone)]
pub struct StackIdAllocator {
    next: u64,
}

impl StackIdAllocator {
    pub fn new(first: u64) -> Self {
        Self { next: first }
    }

    /// Start after the highest id present in `stacks`
    pub fn after(stacks: &[ArmyStack]) -> Self {
        let first = stacks.iter().map(|s| s.id.0 + 1).max().unwrap_or(1);
        Self::new(first)
    }

    pub fn next_id(&mut self) -> StackId {
        let id = StackId(self.next);
        self.next += 1;
        id
    }
}

/// Which side of a battle a stack fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// A group of identical units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmyStack {
    pub id: StackId,
    pub def_id: String,
    pub count: u32,
    /// Remaining HP pool for the whole stack
    pub total_hp: f64,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default)]
    pub equipped_items: Vec<String>,
}

impl ArmyStack {
    /// A full-health stack of `count` units
    pub fn new(id: StackId, def_id: impl Into<String>, count: u32, unit_hp: f64) -> Self {
        Self {
            id,
            def_id: def_id.into(),
            count,
            total_hp: count as f64 * unit_hp,
            upgrades: Vec::new(),
            equipped_items: Vec::new(),
        }
    }

    /// Full-health stack with HP looked up from the registry
    pub fn from_registry(
        id: StackId,
        def_id: &str,
        count: u32,
        registry: &UnitRegistry,
    ) -> Option<Self> {
        let def = registry.get(def_id)?;
        Some(Self::new(id, def_id, count, def.base.hp))
    }

    pub fn is_alive(&self) -> bool {
        self.count > 0
    }

    /// Remove HP from the pool and re-derive the count.
    ///
    /// Returns the HP actually removed (never more than the pool held).
    pub fn take_damage(&mut self, amount: f64, unit_hp: f64) -> f64 {
        let dealt = amount.max(0.0).min(self.total_hp);
        self.total_hp -= dealt;
        self.recount(unit_hp);
        dealt
    }

    /// Heal up to the max pool of the current count. Returns HP restored.
    pub fn heal(&mut self, amount: f64, unit_hp: f64) -> f64 {
        let max_hp = self.count as f64 * unit_hp;
        let before = self.total_hp;
        self.total_hp = (self.total_hp + amount.max(0.0)).min(max_hp);
        self.total_hp - before
    }

    /// Keep `count == ceil(total_hp / unit_hp)`
    pub fn recount(&mut self, unit_hp: f64) {
        if self.total_hp <= 0.0 || unit_hp <= 0.0 {
            self.total_hp = self.total_hp.max(0.0);
            self.count = 0;
            return;
        }
        self.count = (self.total_hp / unit_hp).ceil() as u32;
    }
}

/// Total number of units across an army
pub fn total_count(army: &[ArmyStack]) -> u64 {
    army.iter().map(|s| s.count as u64).sum()
}

/// Total HP across an army
pub fn total_hp(army: &[ArmyStack]) -> f64 {
    army.iter().map(|s| s.total_hp).sum()
}

/// Drop every stack whose count reached zero
pub fn prune_dead(army: &mut Vec<ArmyStack>) {
    army.retain(ArmyStack::is_alive);
}
