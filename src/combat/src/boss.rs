// src/combat/src/boss.rs

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::stats::Stats;

/// Boss pool. Any boss may appear on any boss floor; strength comes from the tier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum BossType {
    BoneColossus,
    Broodmother,
    StormTitan,
    HollowKing,
    EmberWyrm,
}

/// Base numbers before tier scaling
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossDefinition {
    pub boss_type: BossType,
    pub name: &'static str,
    pub glyph: char,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub armor: u32,
    pub xp_reward: u32,
}

impl BossType {
    pub fn definition(self) -> BossDefinition {
        let (name, glyph, hp, attack, defense, armor, xp_reward) = match self {
            BossType::BoneColossus => ("Bone Colossus", 'C', 36, 7, 3, 4, 150),
            BossType::Broodmother => ("Broodmother", 'M', 30, 6, 2, 0, 140),
            BossType::StormTitan => ("Storm Titan", 'T', 44, 8, 4, 6, 180),
            BossType::HollowKing => ("Hollow King", 'K', 40, 9, 3, 4, 170),
            BossType::EmberWyrm => ("Ember Wyrm", 'D', 48, 10, 5, 8, 200),
        };
        BossDefinition {
            boss_type: self,
            name,
            glyph,
            hp,
            attack,
            defense,
            armor,
            xp_reward,
        }
    }
}

/// Boss payload attached to an enemy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossData {
    pub boss_type: BossType,
    pub tier: u32,
    pub is_mini_boss: bool,
}

/// A boss rolled for a specific floor
#[derive(Clone, Debug, PartialEq)]
pub struct ScaledBoss {
    pub definition: BossDefinition,
    pub data: BossData,
    pub stats: Stats,
    pub xp_reward: u32,
}

impl ScaledBoss {
    pub fn display_name(&self) -> String {
        if self.data.is_mini_boss {
            format!("Lesser {}", self.definition.name)
        } else {
            self.definition.name.to_string()
        }
    }
}

mod scaling {
    pub const HP_PER_TIER: f64 = 0.35;
    pub const ATTACK_PER_TIER: f64 = 0.20;
    pub const DEFENSE_PER_TIER: f64 = 0.15;
    pub const XP_PER_TIER: f64 = 0.25;
    pub const MINI_BOSS_FACTOR: f64 = 0.6;
}

/// Stateless boss cadence and scaling rules
pub struct BossManager;

impl BossManager {
    pub fn is_boss_floor(depth: u32) -> bool {
        depth > 0 && depth % 5 == 0
    }

    pub fn boss_tier_for_depth(depth: u32) -> u32 {
        (depth / 5).max(1)
    }

    /// `round(base * (1 + tier * per_tier))`, floor 1
    pub fn scale_stat(base: u32, tier: u32, per_tier: f64) -> u32 {
        let scaled = (base as f64 * (1.0 + tier as f64 * per_tier)).round() as u32;
        scaled.max(1)
    }

    pub fn select_boss<R: Rng + ?Sized>(rng: &mut R) -> BossType {
        let pool: Vec<BossType> = BossType::iter().collect();
        *pool.choose(rng).unwrap_or(&BossType::BoneColossus)
    }

    pub fn scaled(boss_type: BossType, tier: u32) -> ScaledBoss {
        let definition = boss_type.definition();
        let hp = Self::scale_stat(definition.hp, tier, scaling::HP_PER_TIER);
        let stats = Stats {
            max_hp: hp,
            hp,
            attack: Self::scale_stat(definition.attack, tier, scaling::ATTACK_PER_TIER),
            defense: Self::scale_stat(definition.defense, tier, scaling::DEFENSE_PER_TIER),
            max_armor: definition.armor,
            armor: definition.armor,
        };
        ScaledBoss {
            definition,
            data: BossData {
                boss_type,
                tier,
                is_mini_boss: false,
            },
            stats,
            xp_reward: Self::scale_stat(definition.xp_reward, tier, scaling::XP_PER_TIER),
        }
    }

    /// Uniform draw from the pool, scaled for `depth`
    pub fn create_boss<R: Rng + ?Sized>(depth: u32, rng: &mut R) -> ScaledBoss {
        let tier = Self::boss_tier_for_depth(depth);
        let boss = Self::scaled(Self::select_boss(rng), tier);
        tracing::debug!(
            "Rolled boss {} (tier {}) for depth {}",
            boss.data.boss_type,
            tier,
            depth
        );
        boss
    }

    /// Weaker pool boss used on mid-band floors
    pub fn create_mini_boss<R: Rng + ?Sized>(depth: u32, rng: &mut R) -> ScaledBoss {
        let mut boss = Self::create_boss(depth, rng);
        let shrink = |v: u32| ((v as f64) * scaling::MINI_BOSS_FACTOR).round() as u32;
        let hp = shrink(boss.stats.max_hp).max(1);
        boss.stats = Stats {
            max_hp: hp,
            hp,
            attack: shrink(boss.stats.attack).max(1),
            defense: shrink(boss.stats.defense),
            max_armor: shrink(boss.stats.max_armor),
            armor: shrink(boss.stats.max_armor),
        };
        boss.xp_reward = shrink(boss.xp_reward).max(1);
        boss.data.is_mini_boss = true;
        boss
    }

    /// Mini-bosses appear on regular floors three below each boss floor
    pub fn is_mini_boss_floor(depth: u32) -> bool {
        depth % 5 == 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RunRng;

    #[test]
    fn boss_cadence() {
        assert!(BossManager::is_boss_floor(5));
        assert!(BossManager::is_boss_floor(10));
        assert!(!BossManager::is_boss_floor(7));
        assert!(!BossManager::is_boss_floor(0));
    }

    #[test]
    fn tier_for_depth() {
        assert_eq!(BossManager::boss_tier_for_depth(5), 1);
        assert_eq!(BossManager::boss_tier_for_depth(10), 2);
        assert_eq!(BossManager::boss_tier_for_depth(3), 1);
    }

    #[test]
    fn tier_one_colossus_hp() {
        let boss = BossManager::scaled(BossType::BoneColossus, 1);
        assert_eq!(boss.stats.max_hp, 49);
        assert_eq!(boss.stats.hp, 49);
        assert_eq!(boss.stats.attack, 8);
    }

    #[test]
    fn scaling_never_drops_below_one() {
        assert_eq!(BossManager::scale_stat(0, 3, 0.2), 1);
    }

    #[test]
    fn mini_boss_is_weaker() {
        let mut a = RunRng::new(5);
        let mut b = RunRng::new(5);
        let full = BossManager::create_boss(8, &mut a);
        let mini = BossManager::create_mini_boss(8, &mut b);
        assert_eq!(full.data.boss_type, mini.data.boss_type);
        assert!(mini.data.is_mini_boss);
        assert!(mini.stats.max_hp < full.stats.max_hp);
        assert!(mini.display_name().starts_with("Lesser"));
    }

    #[test]
    fn boss_ids_are_snake_case() {
        assert_eq!(BossType::HollowKing.to_string(), "hollow_king");
        assert_eq!("ember_wyrm".parse::<BossType>().unwrap(), BossType::EmberWyrm);
    }
}
