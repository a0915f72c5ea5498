//! Turn phase tracking for the engine.
//!
//! A turn runs to completion inside one `process_action` call: the player
//! action resolves, then (only if it consumed the turn) every living enemy
//! acts, then control returns in `AwaitingPlayerAction`. `GameOver` and
//! `RunComplete` are terminal until a new run starts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnState {
    #[default]
    AwaitingPlayerAction,
    ResolvingPlayerAction,
    ResolvingEnemyTurns,
    /// Player died
    GameOver,
    /// Final floor cleared
    RunComplete,
}

/// What resolving a player action cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCost {
    /// Rejected or bookkeeping-only; enemies do not act
    Free,
    /// Consumed a turn; the enemy phase follows
    Turn,
    /// Consumed a turn by leaving the floor; the new floor's enemies wait
    FloorChange,
}

impl ActionCost {
    pub fn consumed(self) -> bool {
        !matches!(self, ActionCost::Free)
    }
}

/// Phase machine plus the consumed-turn counter
#[derive(Debug, Clone, Default)]
pub struct TurnSystem {
    state: TurnState,
    turn: u64,
}

impl TurnSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the counter from a snapshot
    pub fn resumed_at(turn: u64) -> Self {
        Self {
            state: TurnState::AwaitingPlayerAction,
            turn,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TurnState::GameOver | TurnState::RunComplete)
    }

    pub fn begin_player_action(&mut self) {
        debug_assert_eq!(self.state, TurnState::AwaitingPlayerAction);
        self.state = TurnState::ResolvingPlayerAction;
    }

    /// Counts the turn; call once per consumed action
    pub fn end_player_action(&mut self, cost: ActionCost) {
        if cost.consumed() {
            self.turn += 1;
        }
    }

    pub fn begin_enemy_phase(&mut self) {
        if !self.is_terminal() {
            self.state = TurnState::ResolvingEnemyTurns;
        }
    }

    pub fn finish_turn(&mut self) {
        if !self.is_terminal() {
            self.state = TurnState::AwaitingPlayerAction;
        }
    }

    pub fn game_over(&mut self) {
        tracing::debug!("Turn {}: game over", self.turn);
        self.state = TurnState::GameOver;
    }

    pub fn run_complete(&mut self) {
        self.state = TurnState::RunComplete;
    }
}
