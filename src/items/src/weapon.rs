//src/items/src/weapon.rs
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::tier::MaterialTier;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display,
)]
pub enum WeaponType {
    Dagger,
    Sword,
    Axe,
    Mace,
    Spear,
    Hammer,
}

impl WeaponType {
    pub fn base_damage(self) -> u32 {
        match self {
            WeaponType::Dagger => 2,
            WeaponType::Sword => 4,
            WeaponType::Axe => 5,
            WeaponType::Mace => 4,
            WeaponType::Spear => 3,
            WeaponType::Hammer => 6,
        }
    }
}

/// Derived weapon record. Never persisted; rebuilt from `(material, weapon_type)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeaponTemplate {
    pub material: MaterialTier,
    pub weapon_type: WeaponType,
    pub name: String,
    pub damage: u32,
}

impl WeaponTemplate {
    pub fn new(material: MaterialTier, weapon_type: WeaponType) -> Self {
        Self {
            material,
            weapon_type,
            name: format!("{material} {weapon_type}"),
            damage: weapon_type.base_damage() + material.damage_bonus(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_is_base_plus_tier_bonus() {
        let w = WeaponTemplate::new(MaterialTier::Iron, WeaponType::Sword);
        assert_eq!(w.damage, 8);
        assert_eq!(w.name, "Iron Sword");
        assert_eq!(WeaponTemplate::new(MaterialTier::Wood, WeaponType::Dagger).damage, 2);
    }
}
