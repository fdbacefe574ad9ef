//! Faction and territory descriptors consumed for garrison synthesis

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactionId {
    Player,
    HouseDracul,
    HouseLilitu,
    HouseNecros,
    PeasantVillages,
    ChurchInquisition,
    MerchantGuild,
    VampireHunters,
}

impl FactionId {
    /// Display colour (sRGB components, 0-1) used to tint a side's particles
    pub fn color(self) -> [f32; 4] {
        let hex = match self {
            FactionId::Player => 0xef4444,
            FactionId::HouseDracul => 0x7f1d1d,
            FactionId::HouseLilitu => 0xec4899,
            FactionId::HouseNecros => 0x8b5cf6,
            FactionId::PeasantVillages => 0x10b981,
            FactionId::ChurchInquisition => 0xfbbf24,
            FactionId::MerchantGuild => 0x3b82f6,
            FactionId::VampireHunters => 0x52525b,
        };
        hex_color(hex, 1.0)
    }
}

/// Split 0xRRGGBB into sRGB float components; no gamma conversion
pub fn hex_color(hex: u32, alpha: f32) -> [f32; 4] {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    [r, g, b, alpha]
}

/// Strength tier of a territory's defences
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TerritoryTier {
    Unclaimed = 0,
    Outpost = 1,
    Established = 2,
    Stronghold = 3,
    Dominion = 4,
}

impl TerritoryTier {
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Base multiplier for the garrison's total unit count
    pub fn garrison_multiplier(self) -> f64 {
        match self {
            TerritoryTier::Unclaimed | TerritoryTier::Outpost => 2.0,
            TerritoryTier::Established => 50.0,
            TerritoryTier::Stronghold => 500.0,
            TerritoryTier::Dominion => 2000.0,
        }
    }
}

/// The territory a battle is fought over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryRef {
    pub id: String,
    pub name: String,
    pub faction: FactionId,
    pub tier: TerritoryTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        let c = hex_color(0xff0080, 1.0);
        assert_eq!(c[0], 1.0);
        assert_eq!(c[1], 0.0);
        assert!((c[2] - 128.0 / 255.0).abs() < 1e-6);

        // Faction tints are the raw sRGB bytes scaled to 0-1
        let church = FactionId::ChurchInquisition.color();
        assert_eq!(church, hex_color(0xfbbf24, 1.0));
        assert!((church[1] - 191.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(TerritoryTier::Dominion > TerritoryTier::Stronghold);
        assert_eq!(TerritoryTier::Stronghold.level(), 3);
        assert!(
            TerritoryTier::Dominion.garrison_multiplier()
                > TerritoryTier::Outpost.garrison_multiplier()
        );
    }
}
