mod helpers;

use combat::Stats;
use helpers::*;
use run::{ASHEN_DEPTHS, MetaUpgrade, RunPhase};
use titan_depths::{GameAction, GameEvent, TurnState};

fn walk_to_stairs(engine: &mut titan_depths::GameEngine) {
    let stairs = engine.level().stairs_down;
    let id = player_id(engine);
    assert!(engine.level_mut().move_entity(id, stairs));
}

#[test]
fn final_floor_is_guarded_by_a_boss() {
    let engine = engine_with_config(&one_floor_config(), 21);
    let run = engine.run().unwrap();
    assert_eq!(run.max_floor, 1);
    assert!(engine.level().boss_alive());
}

#[test]
fn stairs_stay_sealed_while_the_boss_lives() {
    let mut engine = engine_with_config(&one_floor_config(), 21);
    walk_to_stairs(&mut engine);

    let events = engine.process_action(GameAction::DescendStairs);
    assert!(matches!(events.as_slice(), [GameEvent::Message(_)]));
    assert_eq!(engine.run_phase(), RunPhase::Active);
    assert_eq!(engine.turn(), 0);
}

#[test]
fn clearing_the_final_floor_wins_the_run() {
    let mut engine = engine_with_config(&one_floor_config(), 21);
    let boss = engine.level().boss_instance.unwrap();
    engine.level_mut().remove_entity(boss);
    walk_to_stairs(&mut engine);

    let events = engine.process_action(GameAction::DescendStairs);
    let result = events
        .iter()
        .find_map(|e| match e {
            GameEvent::RunEnded(result) => Some(result.clone()),
            _ => None,
        })
        .expect("run ended");

    assert!(result.victory);
    assert_eq!(result.floors_cleared, 1);
    assert_eq!(engine.turn_state(), TurnState::RunComplete);
    assert_eq!(engine.run_phase(), RunPhase::Finished { victory: true });

    let profile = engine.profile();
    assert_eq!(profile.runs_won, 1);
    assert!(profile.titan_shards > 0);
    assert!(profile.unlocked_regions.contains(ASHEN_DEPTHS));
}

#[test]
fn locked_region_falls_back_to_the_default() {
    let mut engine = titan_depths::GameEngine::new(&Default::default(), Default::default());
    engine.start_new_run_in(ASHEN_DEPTHS, Some(4));
    assert_eq!(engine.run().unwrap().region_id, run::DEFAULT_REGION);
}

#[test]
fn shards_and_regions_carry_into_the_next_run() {
    let mut engine = engine_with_config(&one_floor_config(), 21);
    let base_hp = engine.player().unwrap().stats.max_hp;
    let boss = engine.level().boss_instance.unwrap();
    engine.level_mut().remove_entity(boss);
    walk_to_stairs(&mut engine);
    engine.process_action(GameAction::DescendStairs);
    assert_eq!(engine.run_phase(), RunPhase::Finished { victory: true });

    engine.profile_mut().titan_shards += 10;
    assert_eq!(engine.profile_mut().purchase(MetaUpgrade::Vitality), Ok(1));

    engine.start_new_run_in(ASHEN_DEPTHS, Some(5));
    assert_eq!(engine.run().unwrap().region_id, ASHEN_DEPTHS);
    assert_eq!(engine.run_phase(), RunPhase::Active);
    assert_eq!(engine.player().unwrap().stats.max_hp, base_hp + 5);
    assert_eq!(engine.profile().runs_started, 2);
}

#[test]
fn kills_are_counted_on_the_run() {
    let mut engine = engine_with_seed(17);
    clear_enemies(&mut engine);
    let pos = player_pos(&engine).offset(1, 0);
    spawn_rat(&mut engine, SCRIPTED_ID_BASE, pos, Stats::new(1, 1, 0));

    engine.process_action(GameAction::Move(combat::Direction::East));
    let run = engine.run().unwrap();
    assert_eq!(run.enemies_killed, 1);
    assert_eq!(run.current_floor, 1);
}

#[test]
fn death_banks_a_defeat() {
    let mut engine = engine_with_seed(33);
    clear_enemies(&mut engine);
    let mut stats = Stats::new(30, 5, 0);
    stats.hp = 1;
    set_player_stats(&mut engine, stats);
    let rat_pos = player_pos(&engine).offset(1, 0);
    spawn_rat(
        &mut engine,
        SCRIPTED_ID_BASE,
        rat_pos,
        Stats::new(50, 10, 0),
    );

    engine.process_action(GameAction::Wait);
    assert_eq!(engine.run_phase(), RunPhase::Finished { victory: false });
    assert_eq!(engine.profile().runs_won, 0);
    assert_eq!(engine.profile().best_floor, 1);
}
