mod helpers;

use combat::Direction;
use helpers::*;
use proptest::prelude::*;
use std::collections::HashSet;
use titan_depths::{GameAction, GameEngine};

fn action() -> impl Strategy<Value = GameAction> {
    prop_oneof![
        6 => prop::sample::select(vec![
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ])
        .prop_map(GameAction::Move),
        2 => Just(GameAction::Wait),
        1 => Just(GameAction::PickUp),
        1 => Just(GameAction::DescendStairs),
        1 => (0i32..32, 0i32..18).prop_map(|(x, y)| GameAction::MoveTo(x, y)),
    ]
}

fn check_world(engine: &GameEngine) -> Result<(), TestCaseError> {
    let level = engine.level();
    let mut occupied = HashSet::new();
    for entity in level.entities() {
        prop_assert!(level.in_bounds(entity.position));
        prop_assert!(level.tile(entity.position).is_walkable());
        prop_assert!(entity.stats.hp > 0, "{} left on the floor dead", entity.name);
        prop_assert!(entity.stats.hp <= entity.stats.max_hp);
        if entity.blocks_movement {
            prop_assert!(occupied.insert(entity.position), "two blockers on {}", entity.position);
        }
    }
    if let Some(player) = engine.player() {
        prop_assert!(player.stats.hp <= player.stats.max_hp);
        prop_assert!(player.stats.armor <= player.stats.max_armor);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_play_keeps_the_world_consistent(
        seed in any::<u64>(),
        actions in proptest::collection::vec(action(), 1..80),
    ) {
        let mut engine = engine_with_seed(seed);
        check_world(&engine)?;
        for action in actions {
            let before = engine.turn();
            engine.process_action(action);
            prop_assert!(engine.turn() >= before);
            check_world(&engine)?;
            if engine.snapshot().is_none() {
                break;
            }
        }
    }
}
