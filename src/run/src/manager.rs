//! Run lifecycle: start, event recorders, floor transitions and finalization

use combat::{KillKind, RunRng};
use rand::Rng;
use std::ops::RangeInclusive;

use crate::state::{FloorInfo, RunPhase, RunResult, RunState};

/// Injected by the embedding engine so the run lifecycle never builds
/// players or floors itself
pub trait RunHooks {
    fn reset_player(&mut self, run: &RunState);
    fn enter_floor(&mut self, run: &RunState, floor: FloorInfo);
}

/// Outcome of clearing a floor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloorTransition {
    NextFloor(FloorInfo),
    Victory(RunResult),
    /// No active run
    Ignored,
}

/// Owns the single active run
#[derive(Debug, Clone)]
pub struct RunManager {
    max_floor_range: RangeInclusive<u32>,
    run: Option<RunState>,
}

impl Default for RunManager {
    fn default() -> Self {
        Self::new(10..=15)
    }
}

impl RunManager {
    pub fn new(max_floor_range: RangeInclusive<u32>) -> Self {
        assert!(
            *max_floor_range.start() >= 1 && !max_floor_range.is_empty(),
            "max floor range must be non-empty and start at 1 or above"
        );
        Self {
            max_floor_range,
            run: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.run.as_ref().map_or(RunPhase::NotStarted, RunState::phase)
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    fn active_mut(&mut self) -> Option<&mut RunState> {
        self.run.as_mut().filter(|r| !r.is_finished)
    }

    /// Seeds a new run, resets the player and enters floor 1
    pub fn start_new_run(
        &mut self,
        seed: Option<u64>,
        region_id: &str,
        now: u64,
        hooks: &mut dyn RunHooks,
    ) -> &RunState {
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = RunRng::new(seed);
        let max_floor = rng.random_range(self.max_floor_range.clone());
        let run = RunState::new(seed, region_id, max_floor, now);
        tracing::info!(
            "Starting run {} in {} ({} floors)",
            run.run_id,
            run.region_id,
            run.max_floor
        );

        hooks.reset_player(&run);
        hooks.enter_floor(&run, FloorInfo::for_floor(1, max_floor));
        self.run.insert(run)
    }

    /// Adopts a run restored from a snapshot; no hooks fire
    pub fn restore(&mut self, run: RunState) {
        tracing::info!("Resuming run {} on floor {}", run.run_id, run.current_floor);
        self.run = Some(run);
    }

    pub fn on_floor_completed(&mut self, now: u64, hooks: &mut dyn RunHooks) -> FloorTransition {
        let Some(run) = self.active_mut() else {
            return FloorTransition::Ignored;
        };
        run.floors_cleared += 1;
        run.current_floor += 1;

        if run.current_floor > run.max_floor {
            return match self.finalize(true, now) {
                Some(result) => FloorTransition::Victory(result),
                None => FloorTransition::Ignored,
            };
        }

        let info = FloorInfo::for_floor(run.current_floor, run.max_floor);
        tracing::debug!("Entering floor {} of {}", info.floor_number, run.max_floor);
        hooks.enter_floor(run, info);
        FloorTransition::NextFloor(info)
    }

    pub fn record_kill(&mut self, kind: KillKind) {
        if let Some(run) = self.active_mut() {
            run.enemies_killed += 1;
            match kind {
                KillKind::Regular => {}
                KillKind::Elite => run.elites_killed += 1,
                KillKind::MiniBoss => run.mini_bosses_killed += 1,
                KillKind::Boss => run.bosses_killed += 1,
            }
        }
    }

    pub fn on_mutation_chosen(&mut self) {
        if let Some(run) = self.active_mut() {
            run.mutations_chosen += 1;
        }
    }

    pub fn add_meta_currency(&mut self, amount: u32) {
        if let Some(run) = self.active_mut() {
            run.meta_currency_earned += amount;
        }
    }

    pub fn on_player_death(&mut self, now: u64) -> Option<RunResult> {
        self.finalize(false, now)
    }

    /// Freezes the run and returns its summary. Later calls return `None`
    /// and leave the frozen state untouched.
    pub fn finalize(&mut self, victory: bool, now: u64) -> Option<RunResult> {
        let run = self.active_mut()?;
        run.is_finished = true;
        run.is_victory = victory;
        run.end_time = Some(now);
        let result = RunResult::from_state(run);
        tracing::info!(
            "Run {} finished: {} after {} floors",
            result.run_id,
            if victory { "victory" } else { "defeat" },
            result.floors_cleared
        );
        Some(result)
    }
}
