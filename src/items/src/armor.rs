//src/items/src/armor.rs
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::tier::MaterialTier;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display,
)]
pub enum ArmorSlot {
    Head,
    Chest,
    Legs,
    Hands,
    Feet,
}

impl ArmorSlot {
    pub fn scale(self) -> f64 {
        match self {
            ArmorSlot::Head => 0.5,
            ArmorSlot::Chest => 1.0,
            ArmorSlot::Legs => 0.75,
            ArmorSlot::Hands => 0.35,
            ArmorSlot::Feet => 0.4,
        }
    }

    pub fn piece_name(self) -> &'static str {
        match self {
            ArmorSlot::Head => "Helm",
            ArmorSlot::Chest => "Chestplate",
            ArmorSlot::Legs => "Greaves",
            ArmorSlot::Hands => "Gauntlets",
            ArmorSlot::Feet => "Boots",
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display,
)]
pub enum ArmorWeight {
    Light,
    Medium,
    Heavy,
}

impl ArmorWeight {
    pub fn multiplier(self) -> f64 {
        match self {
            ArmorWeight::Light => 0.8,
            ArmorWeight::Medium => 1.0,
            ArmorWeight::Heavy => 1.3,
        }
    }
}

/// Derived armor record, rebuilt from `(material, slot, weight)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArmorTemplate {
    pub material: MaterialTier,
    pub slot: ArmorSlot,
    pub weight: ArmorWeight,
    pub name: String,
    pub armor: u32,
}

impl ArmorTemplate {
    pub fn new(material: MaterialTier, slot: ArmorSlot, weight: ArmorWeight) -> Self {
        let raw = material.chest_armor_base() as f64 * slot.scale() * weight.multiplier();
        Self {
            material,
            slot,
            weight,
            name: format!("{weight} {material} {}", slot.piece_name()),
            armor: (raw.round() as u32).max(1),
        }
    }
}
