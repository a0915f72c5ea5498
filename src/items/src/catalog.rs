//src/items/src/catalog.rs
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;

use crate::armor::{ArmorSlot, ArmorTemplate, ArmorWeight};
use crate::tier::MaterialTier;
use crate::weapon::{WeaponTemplate, WeaponType};

/// The only part of an equipment item that is persisted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKey {
    Weapon {
        material: MaterialTier,
        weapon_type: WeaponType,
    },
    Armor {
        material: MaterialTier,
        slot: ArmorSlot,
        weight: ArmorWeight,
    },
}

impl EquipmentKey {
    pub fn material(&self) -> MaterialTier {
        match self {
            EquipmentKey::Weapon { material, .. } | EquipmentKey::Armor { material, .. } => *material,
        }
    }

    pub fn is_weapon(&self) -> bool {
        matches!(self, EquipmentKey::Weapon { .. })
    }

    pub fn weapon_template(&self) -> Option<WeaponTemplate> {
        match *self {
            EquipmentKey::Weapon {
                material,
                weapon_type,
            } => Some(WeaponTemplate::new(material, weapon_type)),
            EquipmentKey::Armor { .. } => None,
        }
    }

    pub fn armor_template(&self) -> Option<ArmorTemplate> {
        match *self {
            EquipmentKey::Armor {
                material,
                slot,
                weight,
            } => Some(ArmorTemplate::new(material, slot, weight)),
            EquipmentKey::Weapon { .. } => None,
        }
    }

    pub fn display_name(&self) -> String {
        match (self.weapon_template(), self.armor_template()) {
            (Some(w), _) => w.name,
            (_, Some(a)) => a.name,
            _ => String::new(),
        }
    }
}

/// Eagerly built table of every weapon and armor template, grouped by tier
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    weapons: HashMap<MaterialTier, Vec<WeaponTemplate>>,
    armor: HashMap<MaterialTier, Vec<ArmorTemplate>>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateCatalog {
    pub fn new() -> Self {
        let mut weapons: HashMap<MaterialTier, Vec<WeaponTemplate>> = HashMap::new();
        let mut armor: HashMap<MaterialTier, Vec<ArmorTemplate>> = HashMap::new();

        for material in MaterialTier::iter() {
            for weapon_type in WeaponType::iter() {
                weapons
                    .entry(material)
                    .or_default()
                    .push(WeaponTemplate::new(material, weapon_type));
            }
            for slot in ArmorSlot::iter() {
                for weight in ArmorWeight::iter() {
                    armor
                        .entry(material)
                        .or_default()
                        .push(ArmorTemplate::new(material, slot, weight));
                }
            }
        }

        Self { weapons, armor }
    }

    pub fn weapons_of(&self, tier: MaterialTier) -> &[WeaponTemplate] {
        self.weapons.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn armor_of(&self, tier: MaterialTier) -> &[ArmorTemplate] {
        self.armor.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.weapons.values().map(Vec::len).sum::<usize>()
            + self.armor.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn random_weapon<R: Rng + ?Sized>(&self, tier: MaterialTier, rng: &mut R) -> Option<EquipmentKey> {
        self.weapons_of(tier).choose(rng).map(|w| EquipmentKey::Weapon {
            material: w.material,
            weapon_type: w.weapon_type,
        })
    }

    pub fn random_armor<R: Rng + ?Sized>(&self, tier: MaterialTier, rng: &mut R) -> Option<EquipmentKey> {
        self.armor_of(tier).choose(rng).map(|a| EquipmentKey::Armor {
            material: a.material,
            slot: a.slot,
            weight: a.weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_combination() {
        let catalog = TemplateCatalog::new();
        // 9 tiers * (6 weapons + 5 slots * 3 weights)
        assert_eq!(catalog.len(), 9 * (6 + 15));
        assert_eq!(catalog.weapons_of(MaterialTier::Steel).len(), 6);
    }

    #[test]
    fn key_serialises_without_template_numbers() {
        let key = EquipmentKey::Weapon {
            material: MaterialTier::Bronze,
            weapon_type: WeaponType::Axe,
        };
        let json = serde_json::to_string(&key).unwrap();
        assert!(!json.contains("damage"));
        let back: EquipmentKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back.weapon_template().unwrap().damage, 7);
    }
}
