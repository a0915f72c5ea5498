// src/dungeon/src/boss_room.rs
//! Hand-authored boss arenas. Layouts are pure geometry scaled to the board.

use combat::{BossType, Position};
use std::collections::HashMap;

/// Inclusive rectangle in tile coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.y0..=self.y1).flat_map(move |y| (self.x0..=self.x1).map(move |x| Position::new(x, y)))
    }

    /// Border tiles only
    pub fn outline(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions()
            .filter(move |p| p.x == self.x0 || p.x == self.x1 || p.y == self.y0 || p.y == self.y1)
    }

    pub fn center(&self) -> Position {
        Position::new((self.x0 + self.x1) / 2, (self.y0 + self.y1) / 2)
    }
}

/// Resolved arena for a concrete board size
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaLayout {
    pub room: Rect,
    pub player_spawn: Position,
    pub boss_spawn: Position,
    pub stairs: Position,
    /// Carved back to wall after the room is opened
    pub obstacles: Vec<Rect>,
    /// Outlined with trap tiles
    pub hazard_rings: Vec<Rect>,
    pub pillars: Vec<Position>,
}

type LayoutFn = fn(i32, i32) -> ArenaLayout;

/// Arena layouts keyed by boss, with a broad default room
pub struct ArenaRegistry {
    layouts: HashMap<BossType, LayoutFn>,
}

impl Default for ArenaRegistry {
    fn default() -> Self {
        let mut layouts: HashMap<BossType, LayoutFn> = HashMap::new();
        layouts.insert(BossType::BoneColossus, pillared_hall);
        layouts.insert(BossType::Broodmother, nest);
        layouts.insert(BossType::StormTitan, split_hall);
        layouts.insert(BossType::EmberWyrm, caldera);
        // HollowKing uses the default broad room
        Self { layouts }
    }
}

impl ArenaRegistry {
    pub fn layout_for(&self, boss: BossType, width: i32, height: i32) -> ArenaLayout {
        match self.layouts.get(&boss) {
            Some(build) => build(width, height),
            None => broad_room(width, height),
        }
    }

    pub fn has_custom_layout(&self, boss: BossType) -> bool {
        self.layouts.contains_key(&boss)
    }
}

/// Whole board minus a one-tile border; player west, boss east
pub fn broad_room(width: i32, height: i32) -> ArenaLayout {
    let room = Rect::new(1, 1, width - 2, height - 2);
    let mid = room.center().y;
    ArenaLayout {
        room,
        player_spawn: Position::new(room.x0, mid),
        boss_spawn: Position::new(room.x1 - 1, mid),
        stairs: Position::new(room.x1, room.y1),
        obstacles: Vec::new(),
        hazard_rings: Vec::new(),
        pillars: Vec::new(),
    }
}

fn pillared_hall(width: i32, height: i32) -> ArenaLayout {
    let mut layout = broad_room(width, height);
    let r = layout.room;
    let qx = (r.x1 - r.x0) / 4;
    let qy = (r.y1 - r.y0) / 4;
    for (x, y) in [
        (r.x0 + qx, r.y0 + qy),
        (r.x1 - qx, r.y0 + qy),
        (r.x0 + qx, r.y1 - qy),
        (r.x1 - qx, r.y1 - qy),
    ] {
        layout.pillars.push(Position::new(x, y));
    }
    layout
}

fn nest(width: i32, height: i32) -> ArenaLayout {
    let mut layout = broad_room(width, height);
    let c = layout.room.center();
    layout.boss_spawn = c;
    layout.hazard_rings.push(Rect::new(c.x - 3, c.y - 2, c.x + 3, c.y + 2));
    layout
}

fn split_hall(width: i32, height: i32) -> ArenaLayout {
    let mut layout = broad_room(width, height);
    let r = layout.room;
    let c = r.center();
    let gap = ((r.y1 - r.y0) / 4).max(1);
    // two wall blocks leave lanes open at the top, middle and bottom
    layout.obstacles.push(Rect::new(c.x - 1, r.y0 + 1, c.x + 1, c.y - gap));
    layout.obstacles.push(Rect::new(c.x - 1, c.y + gap, c.x + 1, r.y1 - 1));
    layout
}

fn caldera(width: i32, height: i32) -> ArenaLayout {
    let mut layout = broad_room(width, height);
    let r = layout.room;
    let c = r.center();
    layout.boss_spawn = c;
    layout.hazard_rings.push(Rect::new(c.x - 4, c.y - 3, c.x + 4, c.y + 3));
    layout.pillars.push(Position::new(c.x - 6, c.y));
    layout.pillars.push(Position::new(c.x + 6, c.y));
    layout
}
