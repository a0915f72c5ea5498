//! Enemy decision making.
//!
//! Dispatch is keyed by `BehaviorType::routine()`. Only the chase routine
//! does anything; the remaining behaviors idle until they get routines of
//! their own.

use combat::{Intent, Position, Routine};
use dungeon::{Entity, Level};

/// Picks the enemy's next action against the player
pub fn decide(level: &Level, enemy: &Entity, player: Option<&Entity>) -> Intent {
    let (Some(state), Some(player)) = (enemy.as_enemy(), player) else {
        return Intent::Idle;
    };
    match state.behavior.routine() {
        Routine::Idle => Intent::Idle,
        Routine::Chase => chase(level, enemy.position, player, state.sight_range),
    }
}

/// Close the gap along the axis of greater misalignment, attacking when adjacent
fn chase(level: &Level, from: Position, player: &Entity, sight_range: u32) -> Intent {
    let target = player.position;
    let sight = sight_range as i32;
    if from.distance_sq(target) > sight * sight {
        return Intent::Idle;
    }
    if from.is_adjacent(target) {
        return Intent::Attack { target: player.id };
    }

    let dx = (target.x - from.x).signum();
    let dy = (target.y - from.y).signum();
    let (primary, secondary) = if (target.x - from.x).abs() >= (target.y - from.y).abs() {
        (from.offset(dx, 0), from.offset(0, dy))
    } else {
        (from.offset(0, dy), from.offset(dx, 0))
    };

    [primary, secondary]
        .into_iter()
        .find(|step| *step != from && level.is_walkable(*step))
        .map_or(Intent::Idle, Intent::MoveTo)
}
