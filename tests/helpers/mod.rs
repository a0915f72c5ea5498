//! Builders shared by the engine integration tests.

#![allow(dead_code)]

use combat::enemy::template_by_id;
use combat::{EnemyState, Position, Stats};
use dungeon::Entity;
use run::MetaProfile;
use titan_depths::{GameConfig, GameEngine};

/// Ids well past anything the generator hands out on a fresh floor
pub const SCRIPTED_ID_BASE: u64 = 50_000;

pub fn engine_with_seed(seed: u64) -> GameEngine {
    engine_with_config(&GameConfig::default(), seed)
}

pub fn engine_with_config(config: &GameConfig, seed: u64) -> GameEngine {
    let mut engine = GameEngine::new(config, MetaProfile::default());
    engine.start_new_run(Some(seed));
    engine
}

/// Single-floor runs: floor 1 is the final (boss) floor
pub fn one_floor_config() -> GameConfig {
    GameConfig {
        min_floors: 1,
        max_floors: 1,
        ..GameConfig::default()
    }
}

pub fn clear_enemies(engine: &mut GameEngine) {
    for id in engine.level().enemy_ids() {
        engine.level_mut().remove_entity(id);
    }
}

pub fn player_pos(engine: &GameEngine) -> Position {
    engine.level().player().expect("player on the floor").position
}

pub fn player_id(engine: &GameEngine) -> u64 {
    engine.player().expect("player exists").id
}

/// Drops a cave rat with the given stats at `pos`
pub fn spawn_rat(engine: &mut GameEngine, id: u64, pos: Position, stats: Stats) -> u64 {
    let template = template_by_id("cave_rat").expect("cave_rat template");
    engine.level_mut().add_entity(Entity::enemy(
        id,
        template.name,
        template.glyph,
        pos,
        stats,
        EnemyState::from_template(template, template.xp_reward),
    ));
    id
}

pub fn set_player_stats(engine: &mut GameEngine, stats: Stats) {
    engine.level_mut().player_mut().expect("player on the floor").stats = stats;
}
