//! Unit definitions and the registry that resolves them
//!
//! Every classification the engines need (role, flight, synergy family,
//! attack signature) is an authored field. Nothing is inferred from ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Broad battlefield tier of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitTier {
    Swarm,
    Tank,
    Support,
    Elite,
    Caster,
    God,
    Hero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Undead,
    Human,
    Mercenary,
}

/// At most one special ability per unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitSpecial {
    #[default]
    None,
    Lifesteal,
    Flying,
    Necromancy,
    DragonFear,
    Cannibalize,
    SwarmTactics,
    Evasion,
    Regeneration,
    LastStand,
    /// One always survives
    Survivor,
    /// Buffs the whole army
    Leader,
}

/// Synergy membership used by composition bonuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitFamily {
    #[default]
    None,
    Skeleton,
    /// Zombies and hulks
    Corpse,
    Lich,
    Dragon,
    /// Vampire knights and lords
    Noble,
    /// Spectres, banshees, bat swarms
    Phantom,
}

/// How a unit fights on the visual battlefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatRole {
    #[default]
    Melee,
    Ranged,
    Magic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreathColor {
    Blight,
    Void,
}

/// Unit-specific visual attack, overriding the role's default effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackSignature {
    #[default]
    Standard,
    /// Cone of breath particles; the unit kites like a caster
    Breath(BreathColor),
    /// Large flash when the target is within arm's reach
    Smite,
    /// Arcing shell that explodes where it lands
    Artillery,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub damage: f64,
    pub hp: f64,
    pub speed: f64,
    pub defense: f64,
}

impl BaseStats {
    pub const fn new(damage: f64, hp: f64, speed: f64, defense: f64) -> Self {
        Self {
            damage,
            hp,
            speed,
            defense,
        }
    }
}

/// Static definition of a unit kind
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: UnitTier,
    pub kind: UnitKind,
    pub base: BaseStats,
    pub special: UnitSpecial,
    pub family: UnitFamily,
    pub role: CombatRole,
    pub flying: bool,
    pub signature: AttackSignature,
    /// Base unit this one evolves from
    pub upgraded_from: Option<&'static str>,
}

impl UnitDef {
    /// A plain melee unit; chain the `with_*` builders for anything else
    pub const fn new(
        id: &'static str,
        name: &'static str,
        tier: UnitTier,
        kind: UnitKind,
        base: BaseStats,
    ) -> Self {
        Self {
            id,
            name,
            tier,
            kind,
            base,
            special: UnitSpecial::None,
            family: UnitFamily::None,
            role: CombatRole::Melee,
            flying: false,
            signature: AttackSignature::Standard,
            upgraded_from: None,
        }
    }

    pub const fn with_special(mut self, special: UnitSpecial) -> Self {
        self.special = special;
        self
    }

    pub const fn with_family(mut self, family: UnitFamily) -> Self {
        self.family = family;
        self
    }

    pub const fn with_role(mut self, role: CombatRole) -> Self {
        self.role = role;
        self
    }

    pub const fn flying(mut self) -> Self {
        self.flying = true;
        self
    }

    pub const fn with_signature(mut self, signature: AttackSignature) -> Self {
        self.signature = signature;
        self
    }

    pub const fn upgraded_from(mut self, base: &'static str) -> Self {
        self.upgraded_from = Some(base);
        self
    }

    pub fn is_leader(&self) -> bool {
        self.special == UnitSpecial::Leader
    }

    /// Ranged, magic and breath units hold position at range instead of closing in
    pub fn kites(&self) -> bool {
        self.role != CombatRole::Melee || matches!(self.signature, AttackSignature::Breath(_))
    }
}

/// Immutable lookup from unit id to definition
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    defs: HashMap<&'static str, UnitDef>,
}

impl UnitRegistry {
    pub fn new(defs: impl IntoIterator<Item = UnitDef>) -> Self {
        Self {
            defs: defs.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    /// The authored unit table
    pub fn standard() -> Self {
        Self::new(standard_units())
    }

    pub fn get(&self, id: &str) -> Option<&UnitDef> {
        self.defs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.defs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Units that evolve from `base`
    pub fn upgrades_of<'a>(&'a self, base: &'a str) -> impl Iterator<Item = &'a UnitDef> + 'a {
        self.defs
            .values()
            .filter(move |d| d.upgraded_from == Some(base))
    }
}

fn standard_units() -> Vec<UnitDef> {
    use AttackSignature::*;
    use CombatRole::*;
    use UnitKind::*;
    use UnitTier::*;

    vec![
        // Undead line
        UnitDef::new("zombie", "Rotting Zombie", Tank, Undead, BaseStats::new(2.0, 18.0, 2.0, 2.0))
            .with_family(UnitFamily::Corpse),
        UnitDef::new("rotting_hulk", "Rotting Hulk", Tank, Undead, BaseStats::new(6.0, 45.0, 3.0, 8.0))
            .with_special(UnitSpecial::Cannibalize)
            .with_family(UnitFamily::Corpse)
            .upgraded_from("zombie"),
        UnitDef::new("skeleton_warrior", "Skeleton Warrior", Swarm, Undead, BaseStats::new(4.0, 8.0, 5.0, 3.0))
            .with_special(UnitSpecial::SwarmTactics)
            .with_family(UnitFamily::Skeleton),
        UnitDef::new("skeleton_archer", "Skeleton Archer", Swarm, Undead, BaseStats::new(3.0, 6.0, 5.0, 1.0))
            .with_family(UnitFamily::Skeleton)
            .with_role(Ranged),
        UnitDef::new("skeleton_champion", "Skeleton Champion", Swarm, Undead, BaseStats::new(12.0, 20.0, 6.0, 10.0))
            .with_special(UnitSpecial::SwarmTactics)
            .with_family(UnitFamily::Skeleton)
            .upgraded_from("skeleton_warrior"),
        UnitDef::new("spectre", "Wailing Spectre", Support, Undead, BaseStats::new(8.0, 15.0, 8.0, 0.0))
            .with_special(UnitSpecial::Evasion)
            .with_family(UnitFamily::Phantom)
            .flying(),
        UnitDef::new("banshee", "Banshee", Support, Undead, BaseStats::new(15.0, 25.0, 9.0, 0.0))
            .with_special(UnitSpecial::Evasion)
            .with_family(UnitFamily::Phantom)
            .flying()
            .upgraded_from("spectre"),
        UnitDef::new("blood_knight", "Blood Knight", Elite, Undead, BaseStats::new(25.0, 90.0, 7.0, 10.0))
            .with_special(UnitSpecial::Lifesteal)
            .with_family(UnitFamily::Noble),
        UnitDef::new("vampire_marksman", "Vampire Marksman", Elite, Undead, BaseStats::new(35.0, 70.0, 7.0, 8.0))
            .with_special(UnitSpecial::Lifesteal)
            .with_role(Ranged),
        UnitDef::new("sanguine_lord", "Sanguine Lord", Elite, Undead, BaseStats::new(50.0, 200.0, 8.0, 20.0))
            .with_special(UnitSpecial::Lifesteal)
            .with_family(UnitFamily::Noble)
            .upgraded_from("blood_knight"),
        UnitDef::new("lich", "Arch Lich", Caster, Undead, BaseStats::new(40.0, 50.0, 5.0, 5.0))
            .with_special(UnitSpecial::Regeneration)
            .with_family(UnitFamily::Lich)
            .with_role(Magic),
        UnitDef::new("ancient_lich", "Ancient Lich", Caster, Undead, BaseStats::new(90.0, 100.0, 6.0, 10.0))
            .with_special(UnitSpecial::Survivor)
            .with_family(UnitFamily::Lich)
            .with_role(Magic)
            .upgraded_from("lich"),
        UnitDef::new("bone_dragon", "Bone Dragon", God, Undead, BaseStats::new(150.0, 800.0, 9.0, 20.0))
            .with_special(UnitSpecial::LastStand)
            .with_family(UnitFamily::Dragon)
            .with_signature(Breath(BreathColor::Blight))
            .flying(),
        UnitDef::new("dracolich", "Dracolich", God, Undead, BaseStats::new(300.0, 2000.0, 10.0, 40.0))
            .with_special(UnitSpecial::Survivor)
            .with_family(UnitFamily::Dragon)
            .with_signature(Breath(BreathColor::Void))
            .flying()
            .upgraded_from("bone_dragon"),
        UnitDef::new("vampire_lord_hero", "Minor Lord", Hero, Undead, BaseStats::new(100.0, 1000.0, 8.0, 30.0))
            .with_special(UnitSpecial::Leader)
            .with_family(UnitFamily::Noble),
        // Mercenaries
        UnitDef::new("sellsword", "Sellsword Veteran", Tank, Mercenary, BaseStats::new(8.0, 35.0, 5.0, 6.0)),
        UnitDef::new("heavy_arbalest", "Heavy Arbalest", Elite, Mercenary, BaseStats::new(20.0, 20.0, 3.0, 4.0))
            .with_role(Ranged),
        UnitDef::new("cultist_warlock", "Cultist Warlock", Caster, Mercenary, BaseStats::new(30.0, 40.0, 6.0, 2.0))
            .with_special(UnitSpecial::Lifesteal)
            .with_role(Magic),
        // Human defenders
        UnitDef::new("peasant_militia", "Peasant Militia", Swarm, Human, BaseStats::new(2.0, 6.0, 4.0, 0.0)),
        UnitDef::new("town_guard", "Town Guard", Tank, Human, BaseStats::new(5.0, 20.0, 4.0, 5.0)),
        UnitDef::new("crossbowman", "Crossbowman", Swarm, Human, BaseStats::new(8.0, 12.0, 4.0, 2.0))
            .with_role(Ranged),
        UnitDef::new("battle_priest", "Battle Priest", Support, Human, BaseStats::new(5.0, 25.0, 5.0, 5.0))
            .with_special(UnitSpecial::Regeneration)
            .with_role(Magic),
        UnitDef::new("crusader", "Holy Crusader", Elite, Human, BaseStats::new(20.0, 80.0, 6.0, 15.0)),
        UnitDef::new("inquisitor", "Inquisitor", Elite, Human, BaseStats::new(25.0, 40.0, 6.0, 5.0)),
        UnitDef::new("witch_hunter", "Witch Hunter", Caster, Human, BaseStats::new(45.0, 60.0, 7.0, 10.0))
            .with_role(Magic),
        UnitDef::new("bombard_cannon", "Bombard Cannon", Caster, Human, BaseStats::new(80.0, 40.0, 1.0, 0.0))
            .with_role(Ranged)
            .with_signature(Artillery),
        UnitDef::new("vampire_hunter", "Legendary Hunter", Hero, Human, BaseStats::new(40.0, 150.0, 9.0, 15.0))
            .with_special(UnitSpecial::Evasion)
            .with_role(Ranged),
        UnitDef::new("seraphim", "Seraphim", God, Human, BaseStats::new(120.0, 1000.0, 9.0, 30.0))
            .with_special(UnitSpecial::Flying)
            .with_role(Magic)
            .with_signature(Smite)
            .flying(),
    ]
}
