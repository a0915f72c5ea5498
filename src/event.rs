//! Ordered log produced by every processed action.
//!
//! The front end appends these to its message window and refreshes derived
//! HUD fields from them; it never re-derives turn order itself.

use combat::{Position, Stats};
use run::RunResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Message(String),

    EntityMoved {
        entity: u64,
        from: Position,
        to: Position,
    },

    EntityAttacked {
        attacker: u64,
        target: u64,
        damage: u32,
    },
    EntityDied {
        entity: u64,
        name: String,
    },
    /// Player stats after any change
    PlayerStatsChanged(Stats),

    LevelGenerated {
        depth: u32,
        is_boss_floor: bool,
    },
    InventoryChanged,

    PlayerLeveledUp {
        level: u32,
        mutation_choices: Vec<String>,
    },
    MutationApplied {
        mutation_id: String,
    },

    PlayerDescended {
        depth: u32,
    },
    PlayerSteppedOnStairs,

    GameOver,
    RunEnded(RunResult),
}

impl GameEvent {
    pub fn message(text: impl Into<String>) -> Self {
        GameEvent::Message(text.into())
    }

    /// Text line for plain-log front ends; `None` for pure state updates
    pub fn describe(&self) -> Option<String> {
        match self {
            GameEvent::Message(text) => Some(text.clone()),
            GameEvent::EntityDied { name, .. } => Some(format!("{name} dies.")),
            GameEvent::LevelGenerated {
                depth,
                is_boss_floor,
            } => Some(if *is_boss_floor {
                format!("Depth {depth}. Something enormous stirs.")
            } else {
                format!("Depth {depth}.")
            }),
            GameEvent::PlayerLeveledUp {
                level,
                mutation_choices,
            } if !mutation_choices.is_empty() => Some(format!(
                "You reached level {level}! Choose a mutation: {}",
                mutation_choices.join(", ")
            )),
            GameEvent::PlayerLeveledUp { level, .. } => Some(format!("You reached level {level}!")),
            GameEvent::MutationApplied { mutation_id } => Some(format!("Mutation acquired: {mutation_id}")),
            GameEvent::PlayerDescended { depth } => Some(format!("You descend to depth {depth}.")),
            GameEvent::PlayerSteppedOnStairs => Some("You stand on the stairs down.".to_string()),
            GameEvent::GameOver => Some("You have fallen.".to_string()),
            GameEvent::RunEnded(result) => Some(format!(
                "Run over ({}): {} floors cleared, {} enemies slain.",
                if result.victory { "victory" } else { "defeat" },
                result.floors_cleared,
                result.enemies_killed
            )),
            GameEvent::EntityMoved { .. }
            | GameEvent::EntityAttacked { .. }
            | GameEvent::PlayerStatsChanged(_)
            | GameEvent::InventoryChanged => None,
        }
    }
}
