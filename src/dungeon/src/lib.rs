//src/dungeon/src/lib.rs
pub mod boss_room;
pub mod entity;
pub mod generator;
pub mod level;
pub mod tile;

pub use crate::boss_room::{ArenaLayout, ArenaRegistry, Rect};
pub use crate::entity::{Entity, Role};
pub use crate::generator::{DungeonGenerator, FloorKind, floor_seed};
pub use crate::level::{IdAllocator, Level};
pub use crate::tile::{Tile, TileType};
