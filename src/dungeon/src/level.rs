// src/dungeon/src/level.rs
use combat::{Direction, Position, VisionSystem};
use items::Item;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::entity::Entity;
use crate::tile::{Tile, TileType};

/// Run-wide id counters. Survive floor regeneration so ids never collide.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next_entity_id: u64,
    next_item_id: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_entity_id: 1,
            next_item_id: 1,
        }
    }
}

impl IdAllocator {
    pub fn allocate_entity_id(&mut self) -> u64 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    pub fn allocate_item_id(&mut self) -> u64 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        id
    }

    /// Moves the counters past ids restored from a snapshot
    pub fn reserve_past(&mut self, entity_id: u64, item_id: u64) {
        self.next_entity_id = self.next_entity_id.max(entity_id + 1);
        self.next_item_id = self.next_item_id.max(item_id + 1);
    }
}

/// One dungeon floor: tile grid, living entities (player included) and loose items
#[derive(Clone, Debug)]
pub struct Level {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
    entities: Vec<Entity>,
    pub ground_items: Vec<Item>,
    pub depth: u32,
    pub stairs_down: Position,
    pub player_spawn: Position,
    pub boss_instance: Option<u64>,
}

impl Level {
    /// Solid rock of the given size
    pub fn new(width: i32, height: i32, depth: u32) -> Self {
        assert!(width > 0 && height > 0, "level must have positive size");
        Self {
            width,
            height,
            tiles: vec![Tile::default(); (width * height) as usize],
            entities: Vec::new(),
            ground_items: Vec::new(),
            depth,
            stairs_down: Position::default(),
            player_spawn: Position::default(),
            boss_instance: None,
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> usize {
        assert!(self.in_bounds(pos), "tile {pos} outside {}x{} level", self.width, self.height);
        (pos.y * self.width + pos.x) as usize
    }

    pub fn tile(&self, pos: Position) -> &Tile {
        &self.tiles[self.index(pos)]
    }

    pub fn set_tile(&mut self, pos: Position, tile_type: TileType) {
        let index = self.index(pos);
        self.tiles[index].tile_type = tile_type;
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (Position::new(i as i32 % width, i as i32 / width), t))
    }

    /// Walkable tile with no blocking entity on it
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && self.tile(pos).is_walkable()
            && self.blocking_entity_at(pos).is_none()
    }

    pub fn entity_at(&self, pos: Position) -> Option<&Entity> {
        self.entities.iter().find(|e| e.position == pos)
    }

    fn blocking_entity_at(&self, pos: Position) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.position == pos && e.blocks_movement)
    }

    pub fn entity(&self, id: u64) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: u64) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Panics on a duplicate id or an out-of-bounds position
    pub fn add_entity(&mut self, entity: Entity) {
        assert!(
            self.entity(entity.id).is_none(),
            "duplicate entity id {}",
            entity.id
        );
        assert!(self.in_bounds(entity.position), "entity placed outside level at {}", entity.position);
        self.entities.push(entity);
    }

    pub fn remove_entity(&mut self, id: u64) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Relocates an entity. Panics when `to` is off the board; returns false
    /// when the tile is impassable or held by another blocking entity.
    pub fn move_entity(&mut self, id: u64, to: Position) -> bool {
        assert!(self.in_bounds(to), "move_entity target {to} out of bounds");
        if !self.tile(to).is_walkable() {
            return false;
        }
        if self.blocking_entity_at(to).is_some_and(|e| e.id != id) {
            return false;
        }
        match self.entity_mut(id) {
            Some(entity) => {
                entity.position = to;
                true
            }
            None => false,
        }
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_player())
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.is_player())
    }

    /// Enemy ids in level order
    pub fn enemy_ids(&self) -> Vec<u64> {
        self.entities
            .iter()
            .filter(|e| !e.is_player())
            .map(|e| e.id)
            .collect()
    }

    pub fn boss_alive(&self) -> bool {
        self.boss_instance
            .is_some_and(|id| self.entity(id).is_some_and(Entity::is_alive))
    }

    pub fn drop_item(&mut self, item: Item, pos: Position) {
        self.ground_items.push(item.at(pos));
    }

    pub fn items_at(&self, pos: Position) -> impl Iterator<Item = &Item> {
        self.ground_items
            .iter()
            .filter(move |i| i.position == Some(pos))
    }

    pub fn take_item(&mut self, id: u64) -> Option<Item> {
        let index = self.ground_items.iter().position(|i| i.id == id)?;
        Some(self.ground_items.remove(index))
    }

    /// Clears visibility, then marks everything in sight of `origin`
    pub fn update_visibility(&mut self, origin: Position, radius: u32) {
        for tile in &mut self.tiles {
            tile.visible = false;
        }
        let visible = {
            let tiles = &self.tiles;
            let width = self.width;
            let blocks = |p: Position| tiles[(p.y * width + p.x) as usize].blocks_vision();
            VisionSystem::calculate_fov(origin, radius, self.width, self.height, &blocks)
        };
        for pos in visible {
            let index = self.index(pos);
            self.tiles[index].set_visible(true);
        }
    }

    /// First step of a 4-way BFS path from `from` to `to`. Entities block
    /// except one standing on `to` itself.
    pub fn next_step_towards(&self, from: Position, to: Position) -> Option<Position> {
        if from == to || !self.in_bounds(to) {
            return None;
        }
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut queue = VecDeque::new();
        came_from.insert(from, from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut step = current;
                while let Some(&prev) = came_from.get(&step) {
                    if prev == from {
                        return Some(step);
                    }
                    step = prev;
                }
                return None;
            }
            for direction in Direction::CARDINAL {
                let next = current.step(direction);
                if !self.in_bounds(next) || came_from.contains_key(&next) {
                    continue;
                }
                let passable = self.tile(next).is_walkable()
                    && (next == to || self.blocking_entity_at(next).is_none());
                if passable {
                    came_from.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}
