//src/items/src/item.rs
use combat::Position;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::catalog::EquipmentKey;

/// What using a consumable does. Data, not closures, so it persists and tests cleanly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumableEffect {
    Heal(u32),
    RestoreArmor(u32),
    RaiseMaxHp(u32),
    RaiseAttack(u32),
    RaiseDefense(u32),
    RaiseMaxArmor(u32),
    GrantXp(u32),
    FullRestore,
    GrantShards(u32),
}

/// Inventory grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
pub enum ItemCategory {
    Weapon,
    Armor,
    Consumable,
    Material,
    Unique,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    EquipmentWeapon,
    EquipmentArmor,
    // restoratives
    MinorHealthPotion,
    HealthPotion,
    GreaterHealthPotion,
    SuperiorHealthPotion,
    Bandage,
    Ration,
    HoneyCake,
    TrollBlood,
    // armor repair
    ArmorScrap,
    ArmorPatch,
    ArmorKit,
    MasterworkKit,
    // permanent boosts
    VitalityElixir,
    MightElixir,
    StoneskinElixir,
    BulwarkElixir,
    TomeOfInsight,
    AncientTome,
    PhoenixFeather,
    // materials
    GoldCoin,
    SilverRing,
    Gemstone,
    BoneDust,
    SpiderSilk,
    IronOre,
    MithrilOre,
    StarMetal,
    DragonScale,
    DemonHorn,
    VoidEssence,
    ArcaneDust,
    AmberResin,
    ChitinPlate,
    GhostLantern,
    // boss uniques
    TitanShard,
    CrownOfTheFallen,
    HeartOfTheDepths,
    EmberCore,
    FrostCore,
    StormCore,
    ShadowCore,
    AncientRelic,
}

impl ItemType {
    pub fn is_equipment(self) -> bool {
        matches!(self, ItemType::EquipmentWeapon | ItemType::EquipmentArmor)
    }

    pub fn category(self) -> ItemCategory {
        use ItemType::*;
        match self {
            EquipmentWeapon => ItemCategory::Weapon,
            EquipmentArmor => ItemCategory::Armor,
            TitanShard | CrownOfTheFallen | HeartOfTheDepths | EmberCore | FrostCore | StormCore
            | ShadowCore | AncientRelic => ItemCategory::Unique,
            _ if self.effect().is_some() => ItemCategory::Consumable,
            _ => ItemCategory::Material,
        }
    }

    /// `None` for equipment and crafting materials
    pub fn effect(self) -> Option<ConsumableEffect> {
        use ConsumableEffect as E;
        use ItemType::*;
        let effect = match self {
            MinorHealthPotion => E::Heal(10),
            HealthPotion => E::Heal(20),
            GreaterHealthPotion => E::Heal(35),
            SuperiorHealthPotion => E::Heal(60),
            Bandage => E::Heal(5),
            Ration => E::Heal(8),
            HoneyCake => E::Heal(12),
            TrollBlood => E::Heal(25),
            ArmorScrap => E::RestoreArmor(3),
            ArmorPatch => E::RestoreArmor(6),
            ArmorKit => E::RestoreArmor(12),
            MasterworkKit => E::RestoreArmor(25),
            VitalityElixir => E::RaiseMaxHp(5),
            MightElixir => E::RaiseAttack(1),
            StoneskinElixir => E::RaiseDefense(1),
            BulwarkElixir => E::RaiseMaxArmor(3),
            TomeOfInsight => E::GrantXp(50),
            AncientTome => E::GrantXp(150),
            PhoenixFeather => E::FullRestore,
            TitanShard => E::GrantShards(5),
            CrownOfTheFallen => E::RaiseMaxHp(15),
            HeartOfTheDepths => E::RaiseMaxHp(25),
            EmberCore => E::RaiseAttack(2),
            FrostCore => E::RaiseDefense(2),
            StormCore => E::RaiseMaxArmor(6),
            ShadowCore => E::GrantXp(300),
            AncientRelic => E::GrantShards(15),
            _ => return None,
        };
        Some(effect)
    }

    pub fn glyph(self) -> char {
        match self.category() {
            ItemCategory::Weapon => ')',
            ItemCategory::Armor => '[',
            ItemCategory::Consumable => '!',
            ItemCategory::Material => '*',
            ItemCategory::Unique => '&',
        }
    }

    /// Human-readable name, e.g. `MinorHealthPotion` -> "Minor Health Potion"
    pub fn display_name(self) -> String {
        let raw = self.to_string();
        let mut out = String::with_capacity(raw.len() + 4);
        for (i, ch) in raw.chars().enumerate() {
            if i > 0 && ch.is_uppercase() {
                out.push(' ');
            }
            out.push(ch);
        }
        out
    }
}

/// An item instance, on the ground or in an inventory.
///
/// `equipment` is set exactly for the two equipment types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub item_type: ItemType,
    pub position: Option<Position>,
    pub is_equipped: bool,
    pub equipment: Option<EquipmentKey>,
    pub quantity: u32,
    pub inventory_index: Option<usize>,
}

impl Item {
    pub fn new(id: u64, item_type: ItemType, quantity: u32) -> Self {
        assert!(
            !item_type.is_equipment(),
            "equipment items must be built with Item::equipment"
        );
        Self {
            id,
            item_type,
            position: None,
            is_equipped: false,
            equipment: None,
            quantity: quantity.max(1),
            inventory_index: None,
        }
    }

    pub fn equipment(id: u64, key: EquipmentKey) -> Self {
        let item_type = if key.is_weapon() {
            ItemType::EquipmentWeapon
        } else {
            ItemType::EquipmentArmor
        };
        Self {
            id,
            item_type,
            position: None,
            is_equipped: false,
            equipment: Some(key),
            quantity: 1,
            inventory_index: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn name(&self) -> String {
        match &self.equipment {
            Some(key) => key.display_name(),
            None => self.item_type.display_name(),
        }
    }

    pub fn is_stackable(&self) -> bool {
        !self.item_type.is_equipment()
    }

    pub fn can_stack_with(&self, other: &Item) -> bool {
        self.is_stackable()
            && other.is_stackable()
            && self.item_type == other.item_type
            && self.equipment == other.equipment
    }
}
