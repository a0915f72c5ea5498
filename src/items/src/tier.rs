//src/items/src/tier.rs
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Nine-rung material ladder, weakest first
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display,
)]
pub enum MaterialTier {
    Wood,
    Copper,
    Bronze,
    Iron,
    Steel,
    Mithril,
    Adamantite,
    Obsidian,
    Starforged,
}

const DAMAGE_BONUS: [u32; 9] = [0, 1, 2, 4, 6, 8, 11, 14, 18];
const CHEST_ARMOR_BASE: [u32; 9] = [2, 4, 6, 9, 12, 16, 21, 27, 34];

impl MaterialTier {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    pub fn damage_bonus(self) -> u32 {
        DAMAGE_BONUS[self.index()]
    }

    pub fn chest_armor_base(self) -> u32 {
        CHEST_ARMOR_BASE[self.index()]
    }
}

/// Depth band: which tiers may drop and how often equipment drops at all
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthBand {
    pub min_tier: MaterialTier,
    pub max_tier: MaterialTier,
    pub drop_chance: f64,
}

impl DepthBand {
    pub fn for_depth(depth: u32) -> Self {
        use MaterialTier::*;
        let (min_tier, max_tier, drop_chance) = match depth {
            0..=5 => (Wood, Bronze, 0.20),
            6..=10 => (Copper, Steel, 0.25),
            11..=15 => (Iron, Adamantite, 0.30),
            _ => (Mithril, Starforged, 0.35),
        };
        Self {
            min_tier,
            max_tier,
            drop_chance,
        }
    }

    pub fn tiers(&self) -> Vec<MaterialTier> {
        MaterialTier::iter()
            .filter(|t| *t >= self.min_tier && *t <= self.max_tier)
            .collect()
    }

    /// Linearly descending weights: the weakest eligible tier is the most common
    pub fn weighted_tiers(&self) -> Vec<(MaterialTier, f64)> {
        let tiers = self.tiers();
        let n = tiers.len();
        tiers
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, (n - i) as f64))
            .collect()
    }
}
