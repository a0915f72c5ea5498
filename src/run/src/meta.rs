//! Cross-run meta progression: Titan Shards, permanent upgrades, regions

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

use crate::manager::RunManager;
use crate::state::{DEFAULT_REGION, RunResult};

/// Region unlocked by the first victory in the default region
pub const ASHEN_DEPTHS: &str = "ashen_depths";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetaError {
    #[error("{0} is already at max level")]
    MaxLevel(MetaUpgrade),
    #[error("need {needed} shards, have {available}")]
    InsufficientShards { needed: u32, available: u32 },
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
#[strum(ascii_case_insensitive)]
pub enum MetaUpgrade {
    /// +5 max HP per level
    Vitality,
    /// +1 attack per level
    Might,
    /// +2 max armor per level
    Plating,
    /// +1 starting health potion per level
    Provisions,
}

impl MetaUpgrade {
    pub fn base_cost(self) -> u32 {
        match self {
            MetaUpgrade::Vitality => 10,
            MetaUpgrade::Might => 15,
            MetaUpgrade::Plating => 12,
            MetaUpgrade::Provisions => 8,
        }
    }

    pub fn max_level(self) -> u32 {
        match self {
            MetaUpgrade::Provisions => 3,
            _ => 5,
        }
    }

    /// Cost of buying the level after `current`
    pub fn cost_at(self, current: u32) -> u32 {
        self.base_cost() * (current + 1)
    }
}

/// Bonuses a fresh player receives from purchased upgrades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartingBonuses {
    pub max_hp: u32,
    pub attack: u32,
    pub max_armor: u32,
    pub health_potions: u32,
}

/// Persistent profile shared by every run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaProfile {
    pub titan_shards: u32,
    pub lifetime_shards: u32,
    pub upgrade_levels: BTreeMap<MetaUpgrade, u32>,
    pub unlocked_regions: BTreeSet<String>,
    pub runs_started: u32,
    pub runs_won: u32,
    pub best_floor: u32,
}

impl Default for MetaProfile {
    fn default() -> Self {
        Self {
            titan_shards: 0,
            lifetime_shards: 0,
            upgrade_levels: BTreeMap::new(),
            unlocked_regions: [DEFAULT_REGION.to_string()].into_iter().collect(),
            runs_started: 0,
            runs_won: 0,
            best_floor: 0,
        }
    }
}

impl MetaProfile {
    pub fn level_of(&self, upgrade: MetaUpgrade) -> u32 {
        self.upgrade_levels.get(&upgrade).copied().unwrap_or(0)
    }

    pub fn is_region_unlocked(&self, region: &str) -> bool {
        self.unlocked_regions.contains(region)
    }

    /// Spends shards on the next level of `upgrade`, returning the new level
    pub fn purchase(&mut self, upgrade: MetaUpgrade) -> Result<u32, MetaError> {
        let current = self.level_of(upgrade);
        if current >= upgrade.max_level() {
            return Err(MetaError::MaxLevel(upgrade));
        }
        let cost = upgrade.cost_at(current);
        if self.titan_shards < cost {
            return Err(MetaError::InsufficientShards {
                needed: cost,
                available: self.titan_shards,
            });
        }
        self.titan_shards -= cost;
        self.upgrade_levels.insert(upgrade, current + 1);
        Ok(current + 1)
    }

    pub fn starting_bonuses(&self) -> StartingBonuses {
        StartingBonuses {
            max_hp: 5 * self.level_of(MetaUpgrade::Vitality),
            attack: self.level_of(MetaUpgrade::Might),
            max_armor: 2 * self.level_of(MetaUpgrade::Plating),
            health_potions: self.level_of(MetaUpgrade::Provisions),
        }
    }

    /// Every upgrade with its current level and the price of the next one
    pub fn upgrade_offers(&self) -> Vec<(MetaUpgrade, u32, Option<u32>)> {
        MetaUpgrade::iter()
            .map(|upgrade| {
                let level = self.level_of(upgrade);
                let cost = (level < upgrade.max_level()).then(|| upgrade.cost_at(level));
                (upgrade, level, cost)
            })
            .collect()
    }

    pub fn record_run_started(&mut self) {
        self.runs_started += 1;
    }
}

/// What a finished run paid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReward {
    pub shards: u32,
    pub unlocked_region: Option<String>,
}

/// Converts run results into meta progress
pub struct RunEndManager;

impl RunEndManager {
    pub fn apply_result(result: &RunResult, profile: &mut MetaProfile) -> RunReward {
        let shards = result.shards();
        profile.titan_shards += shards;
        profile.lifetime_shards += shards;
        profile.best_floor = profile.best_floor.max(result.deepest_floor);

        let mut unlocked_region = None;
        if result.victory {
            profile.runs_won += 1;
            if result.region_id == DEFAULT_REGION && profile.unlocked_regions.insert(ASHEN_DEPTHS.to_string()) {
                tracing::info!("Unlocked region {}", ASHEN_DEPTHS);
                unlocked_region = Some(ASHEN_DEPTHS.to_string());
            }
        }

        RunReward {
            shards,
            unlocked_region,
        }
    }

    /// Finalizes the active run and banks its reward. `None` when the run
    /// was already finished.
    pub fn end_run(
        manager: &mut RunManager,
        victory: bool,
        now: u64,
        profile: &mut MetaProfile,
    ) -> Option<(RunResult, RunReward)> {
        let result = manager.finalize(victory, now)?;
        let reward = Self::apply_result(&result, profile);
        Some((result, reward))
    }
}
