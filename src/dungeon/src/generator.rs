// src/dungeon/src/generator.rs
use combat::enemy::{EnemyTemplate, templates_for_depth};
use combat::rng::derive_seed;
use combat::{BehaviorType, BossManager, EnemyScalingConfig, EnemyState, Position, ScaledBoss};
use items::{Item, ItemType};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::boss_room::{ArenaLayout, ArenaRegistry, Rect};
use crate::entity::Entity;
use crate::level::{IdAllocator, Level};
use crate::tile::TileType;

const TILES_PER_ENEMY: usize = 15;
const ELITE_MIN_DEPTH: u32 = 3;
const ELITE_CHANCE: f64 = 0.10;
const BOSS_SIGHT: u32 = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloorKind {
    Regular,
    Boss,
}

/// Seed for the layout of `floor`, stable across save and resume
pub fn floor_seed(run_seed: u64, floor: u32) -> u64 {
    derive_seed(run_seed, floor as u64)
}

/// Single-room floor builder with boss arenas
#[derive(Default)]
pub struct DungeonGenerator {
    pub scaling: EnemyScalingConfig,
    pub arenas: ArenaRegistry,
}

impl DungeonGenerator {
    pub fn generate<R: Rng + ?Sized>(
        &self,
        width: i32,
        height: i32,
        depth: u32,
        kind: FloorKind,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Level {
        assert!(width >= 5 && height >= 5, "board {width}x{height} too small for a room");
        let level = match kind {
            FloorKind::Regular => self.regular_floor(width, height, depth, ids, rng),
            FloorKind::Boss => self.boss_floor(width, height, depth, ids, rng),
        };
        tracing::debug!(
            "Generated depth {} ({:?}) {}x{} with {} enemies and {} items",
            depth,
            kind,
            width,
            height,
            level.enemy_ids().len(),
            level.ground_items.len()
        );
        level
    }

    fn regular_floor<R: Rng + ?Sized>(
        &self,
        width: i32,
        height: i32,
        depth: u32,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Level {
        let mut level = Level::new(width, height, depth);
        let mx = (width / 4).max(1);
        let my = (height / 4).max(1);
        let room = Rect::new(mx, my, width - 1 - mx, height - 1 - my);
        carve(&mut level, &room);

        level.player_spawn = Position::new(room.x0, room.y0);
        level.stairs_down = Position::new(room.x1, room.y1);
        level.set_tile(level.stairs_down, TileType::StairsDown);

        let mut free: Vec<Position> = room
            .positions()
            .filter(|p| *p != level.player_spawn && *p != level.stairs_down)
            .collect();
        free.shuffle(rng);

        let count = (free.len() / TILES_PER_ENEMY).max(1).min(free.len());
        let templates = templates_for_depth(depth);
        let spawn_mini_boss = BossManager::is_mini_boss_floor(depth);

        for (n, pos) in free.drain(..count).enumerate() {
            let entity = if n == 0 && spawn_mini_boss {
                let boss = BossManager::create_mini_boss(depth, rng);
                boss_entity(boss, ids.allocate_entity_id(), pos)
            } else {
                let Some(template) = templates.choose(rng) else {
                    continue;
                };
                self.spawn_enemy(template, depth, pos, ids, rng)
            };
            level.add_entity(entity);
        }

        let item_count = (1 + depth as usize / 4).min(3).min(free.len());
        for pos in free.drain(..item_count) {
            let item_type = *ground_pool(depth).choose(rng).unwrap_or(&ItemType::Bandage);
            level.drop_item(Item::new(ids.allocate_item_id(), item_type, 1), pos);
        }

        if depth >= 2 {
            let trap_count = (depth as usize / 2).min(4).min(free.len());
            for pos in free.drain(..trap_count) {
                level.set_tile(pos, TileType::Trap);
            }
        }

        level
    }

    fn boss_floor<R: Rng + ?Sized>(
        &self,
        width: i32,
        height: i32,
        depth: u32,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Level {
        let boss = BossManager::create_boss(depth, rng);
        let layout = self.arenas.layout_for(boss.data.boss_type, width, height);
        let mut level = Level::new(width, height, depth);
        apply_layout(&mut level, &layout);

        let id = ids.allocate_entity_id();
        level.add_entity(boss_entity(boss, id, layout.boss_spawn));
        level.boss_instance = Some(id);
        level
    }

    fn spawn_enemy<R: Rng + ?Sized>(
        &self,
        template: &EnemyTemplate,
        depth: u32,
        pos: Position,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Entity {
        let (mut stats, xp) = self.scaling.scaled(template, depth);
        let mut state = EnemyState::from_template(template, xp);
        let mut name = template.name.to_string();
        if depth >= ELITE_MIN_DEPTH && rng.random_bool(ELITE_CHANCE) {
            state.promote_to_elite(&mut stats);
            name = format!("Elite {name}");
        }
        Entity::enemy(ids.allocate_entity_id(), name, template.glyph, pos, stats, state)
    }
}

fn carve(level: &mut Level, room: &Rect) {
    for pos in room.positions() {
        level.set_tile(pos, TileType::Floor);
    }
}

fn apply_layout(level: &mut Level, layout: &ArenaLayout) {
    carve(level, &layout.room);
    for rect in &layout.obstacles {
        let in_bounds: Vec<_> = rect.positions().filter(|p| level.in_bounds(*p)).collect();
        for pos in in_bounds {
            level.set_tile(pos, TileType::Wall);
        }
    }
    for ring in &layout.hazard_rings {
        for pos in ring.outline().filter(|p| layout.room.contains(*p)) {
            level.set_tile(pos, TileType::Trap);
        }
    }
    for pillar in layout.pillars.iter().filter(|p| layout.room.contains(**p)) {
        level.set_tile(*pillar, TileType::Wall);
    }

    level.set_tile(layout.player_spawn, TileType::Floor);
    level.set_tile(layout.boss_spawn, TileType::Floor);
    level.set_tile(layout.stairs, TileType::StairsDown);
    level.player_spawn = layout.player_spawn;
    level.stairs_down = layout.stairs;
}

fn boss_entity(boss: ScaledBoss, id: u64, pos: Position) -> Entity {
    let name = boss.display_name();
    let (behavior, tag) = if boss.data.is_mini_boss {
        (BehaviorType::MiniBoss, "mini_boss")
    } else {
        (BehaviorType::Boss, "boss")
    };
    let state = EnemyState {
        template_id: boss.data.boss_type.to_string(),
        behavior,
        boss: Some(boss.data),
        xp_reward: boss.xp_reward,
        sight_range: BOSS_SIGHT,
        tags: [tag.to_string()].into_iter().collect(),
        intent: Default::default(),
        poison_turns: 0,
    };
    Entity::enemy(id, name, boss.definition.glyph, pos, boss.stats, state)
}

fn ground_pool(depth: u32) -> &'static [ItemType] {
    use ItemType::*;
    match depth {
        0..=5 => &[MinorHealthPotion, Bandage, Ration, ArmorScrap],
        6..=10 => &[MinorHealthPotion, HealthPotion, Ration, ArmorPatch, HoneyCake],
        _ => &[HealthPotion, GreaterHealthPotion, ArmorKit, TrollBlood],
    }
}
