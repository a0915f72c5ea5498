//! Run state and the summary produced when a run ends

use serde::{Deserialize, Serialize};

/// Region every profile starts with
pub const DEFAULT_REGION: &str = "sunken_halls";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    NotStarted,
    Active,
    Finished { victory: bool },
}

/// Counters for one playthrough. Frozen once `is_finished` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub run_id: String,
    pub region_id: String,
    pub seed: u64,
    pub max_floor: u32,
    pub current_floor: u32,
    pub floors_cleared: u32,
    pub enemies_killed: u32,
    pub elites_killed: u32,
    pub bosses_killed: u32,
    pub mini_bosses_killed: u32,
    pub meta_currency_earned: u32,
    pub mutations_chosen: u32,
    /// Unix epoch milliseconds
    pub start_time: u64,
    pub end_time: Option<u64>,
    pub is_finished: bool,
    pub is_victory: bool,
}

impl RunState {
    pub fn new(seed: u64, region_id: &str, max_floor: u32, now: u64) -> Self {
        Self {
            run_id: format!("run-{seed:016x}"),
            region_id: region_id.to_string(),
            seed,
            max_floor,
            current_floor: 1,
            floors_cleared: 0,
            enemies_killed: 0,
            elites_killed: 0,
            bosses_killed: 0,
            mini_bosses_killed: 0,
            meta_currency_earned: 0,
            mutations_chosen: 0,
            start_time: now,
            end_time: None,
            is_finished: false,
            is_victory: false,
        }
    }

    pub fn phase(&self) -> RunPhase {
        if self.is_finished {
            RunPhase::Finished {
                victory: self.is_victory,
            }
        } else {
            RunPhase::Active
        }
    }
}

/// Whether `floor` hosts a boss: every fifth floor below the last, plus the last
pub fn is_boss_floor(floor: u32, max_floor: u32) -> bool {
    (floor % 5 == 0 && floor < max_floor) || floor == max_floor
}

/// What the hooks need to build a floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorInfo {
    pub floor_number: u32,
    pub is_boss_floor: bool,
    pub is_final_floor: bool,
}

impl FloorInfo {
    pub fn for_floor(floor: u32, max_floor: u32) -> Self {
        Self {
            floor_number: floor,
            is_boss_floor: is_boss_floor(floor, max_floor),
            is_final_floor: floor == max_floor,
        }
    }
}

/// Immutable summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub run_id: String,
    pub region_id: String,
    pub victory: bool,
    pub floors_cleared: u32,
    pub deepest_floor: u32,
    pub enemies_killed: u32,
    pub elites_killed: u32,
    pub mini_bosses_killed: u32,
    pub bosses_killed: u32,
    pub mutations_chosen: u32,
    pub meta_currency_earned: u32,
    pub duration_ms: u64,
}

mod rewards {
    pub const PER_FLOOR: u32 = 5;
    pub const PER_ELITE: u32 = 3;
    pub const PER_MINI_BOSS: u32 = 8;
    pub const PER_BOSS: u32 = 20;
    pub const VICTORY_BONUS: u32 = 50;
}

impl RunResult {
    pub fn from_state(run: &RunState) -> Self {
        Self {
            run_id: run.run_id.clone(),
            region_id: run.region_id.clone(),
            victory: run.is_victory,
            floors_cleared: run.floors_cleared,
            deepest_floor: run.current_floor.min(run.max_floor),
            enemies_killed: run.enemies_killed,
            elites_killed: run.elites_killed,
            mini_bosses_killed: run.mini_bosses_killed,
            bosses_killed: run.bosses_killed,
            mutations_chosen: run.mutations_chosen,
            meta_currency_earned: run.meta_currency_earned,
            duration_ms: run
                .end_time
                .map_or(0, |end| end.saturating_sub(run.start_time)),
        }
    }

    /// Titan Shards this result is worth
    pub fn shards(&self) -> u32 {
        let victory = if self.victory { rewards::VICTORY_BONUS } else { 0 };
        rewards::PER_FLOOR * self.floors_cleared
            + rewards::PER_ELITE * self.elites_killed
            + rewards::PER_MINI_BOSS * self.mini_bosses_killed
            + rewards::PER_BOSS * self.bosses_killed
            + self.meta_currency_earned
            + victory
    }
}
