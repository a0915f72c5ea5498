//src/items/src/lib.rs
pub mod armor;
pub mod catalog;
pub mod item;
pub mod loot;
pub mod tier;
pub mod weapon;

pub use crate::armor::{ArmorSlot, ArmorTemplate, ArmorWeight};
pub use crate::catalog::{EquipmentKey, TemplateCatalog};
pub use crate::item::{ConsumableEffect, Item, ItemCategory, ItemType};
pub use crate::loot::{BossLoot, EquipmentDrops, LootDrop};
pub use crate::tier::{DepthBand, MaterialTier};
pub use crate::weapon::{WeaponTemplate, WeaponType};
