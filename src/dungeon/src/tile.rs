// src/dungeon/src/tile.rs
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileType {
    Floor,
    Wall,
    DoorOpen,
    DoorClosed,
    StairsDown,
    Trap,
}

impl TileType {
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileType::Wall | TileType::DoorClosed)
    }

    pub fn blocks_vision(self) -> bool {
        matches!(self, TileType::Wall | TileType::DoorClosed)
    }

    pub fn glyph(self) -> char {
        match self {
            TileType::Floor => '.',
            TileType::Wall => '#',
            TileType::DoorOpen => '\'',
            TileType::DoorClosed => '+',
            TileType::StairsDown => '>',
            TileType::Trap => '^',
        }
    }
}

/// A map cell. `visible` is recomputed every turn; `discovered` only ever turns on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    pub visible: bool,
    pub discovered: bool,
}

impl Tile {
    pub fn new(tile_type: TileType) -> Self {
        Self {
            tile_type,
            visible: false,
            discovered: false,
        }
    }

    pub fn is_walkable(&self) -> bool {
        self.tile_type.is_walkable()
    }

    pub fn blocks_vision(&self) -> bool {
        self.tile_type.blocks_vision()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            self.discovered = true;
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::new(TileType::Wall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_and_closed_doors_block() {
        assert!(!TileType::Wall.is_walkable());
        assert!(!TileType::DoorClosed.is_walkable());
        assert!(TileType::Trap.is_walkable());
        assert!(TileType::DoorClosed.blocks_vision());
        assert!(!TileType::DoorOpen.blocks_vision());
    }

    #[test]
    fn discovery_is_sticky() {
        let mut tile = Tile::new(TileType::Floor);
        tile.set_visible(true);
        tile.set_visible(false);
        assert!(!tile.visible);
        assert!(tile.discovered);
    }
}
