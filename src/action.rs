// src/action.rs
use combat::Direction;
use serde::{Deserialize, Serialize};

/// One player intent per call to `GameEngine::process_action`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    Move(Direction),
    Wait,
    DescendStairs,
    UseItem(u64),
    EquipItem(u64),
    PickUp,
    /// One pathfinding step toward the target tile
    MoveTo(i32, i32),
    /// Free action; resolves the oldest pending level-up offer
    ChooseMutation(String),
}
