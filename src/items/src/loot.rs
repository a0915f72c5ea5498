//src/items/src/loot.rs
//! Weighted loot rolls: equipment drops, the shared boss table and uniques.
use rand::Rng;
use std::ops::RangeInclusive;

use crate::catalog::{EquipmentKey, TemplateCatalog};
use crate::item::{Item, ItemType};
use crate::tier::DepthBand;

/// Cumulative-weight roulette. Returns the first entry whose running total
/// reaches `roll` (inclusive); falls back to the last entry for float drift.
pub fn pick_by_roll<T, F>(entries: &[T], weight: F, roll: f64) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    let mut cumulative = 0.0;
    for entry in entries {
        cumulative += weight(entry);
        if roll <= cumulative {
            return Some(entry);
        }
    }
    entries.last()
}

/// Roll `U(0, total)` and resolve it with [`pick_by_roll`]
pub fn roll_weighted<'a, T, F, R>(entries: &'a [T], weight: F, rng: &mut R) -> Option<&'a T>
where
    F: Fn(&T) -> f64,
    R: Rng + ?Sized,
{
    let total: f64 = entries.iter().map(&weight).sum();
    if entries.is_empty() || total <= 0.0 {
        return None;
    }
    let roll = rng.random::<f64>() * total;
    pick_by_roll(entries, weight, roll)
}

/// An unallocated drop. The caller assigns the item id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LootDrop {
    pub item_type: ItemType,
    pub equipment: Option<EquipmentKey>,
    pub quantity: u32,
}

impl LootDrop {
    pub fn consumable(item_type: ItemType, quantity: u32) -> Self {
        Self {
            item_type,
            equipment: None,
            quantity,
        }
    }

    pub fn equipment(key: EquipmentKey) -> Self {
        let item_type = if key.is_weapon() {
            ItemType::EquipmentWeapon
        } else {
            ItemType::EquipmentArmor
        };
        Self {
            item_type,
            equipment: Some(key),
            quantity: 1,
        }
    }

    pub fn into_item(self, id: u64) -> Item {
        match self.equipment {
            Some(key) => Item::equipment(id, key),
            None => Item::new(id, self.item_type, self.quantity),
        }
    }
}

/// Depth-banded equipment drops
pub struct EquipmentDrops;

impl EquipmentDrops {
    pub fn should_drop_equipment<R: Rng + ?Sized>(depth: u32, rng: &mut R) -> bool {
        rng.random_bool(DepthBand::for_depth(depth).drop_chance)
    }

    /// Weapon-or-armor coin flip, tier by descending weight, then a uniform template
    pub fn roll_equipment<R: Rng + ?Sized>(
        depth: u32,
        catalog: &TemplateCatalog,
        rng: &mut R,
    ) -> Option<EquipmentKey> {
        let weapon = rng.random_bool(0.5);
        let weighted = DepthBand::for_depth(depth).weighted_tiers();
        let (tier, _) = *roll_weighted(&weighted, |(_, w)| *w, rng)?;
        if weapon {
            catalog.random_weapon(tier, rng)
        } else {
            catalog.random_armor(tier, rng)
        }
    }

    /// Gate then roll; what a regular enemy drops on death
    pub fn roll_drop<R: Rng + ?Sized>(
        depth: u32,
        catalog: &TemplateCatalog,
        rng: &mut R,
    ) -> Option<EquipmentKey> {
        if Self::should_drop_equipment(depth, rng) {
            Self::roll_equipment(depth, catalog, rng)
        } else {
            None
        }
    }
}

/// Entry in the shared boss loot table, gated by boss tier
#[derive(Clone, Debug)]
pub struct LootEntry {
    pub item_type: ItemType,
    pub weight: f64,
    pub min_tier: u32,
    pub max_tier: u32,
    pub quantity: RangeInclusive<u32>,
}

impl LootEntry {
    const fn new(item_type: ItemType, weight: f64, min_tier: u32, max_tier: u32, quantity: RangeInclusive<u32>) -> Self {
        Self {
            item_type,
            weight,
            min_tier,
            max_tier,
            quantity,
        }
    }

    pub fn allows(&self, tier: u32) -> bool {
        tier >= self.min_tier && tier <= self.max_tier
    }
}

pub fn global_loot_table() -> Vec<LootEntry> {
    use ItemType::*;
    vec![
        LootEntry::new(HealthPotion, 10.0, 1, 2, 1..=2),
        LootEntry::new(GreaterHealthPotion, 8.0, 2, u32::MAX, 1..=2),
        LootEntry::new(SuperiorHealthPotion, 5.0, 4, u32::MAX, 1..=1),
        LootEntry::new(ArmorKit, 7.0, 1, 3, 1..=1),
        LootEntry::new(MasterworkKit, 4.0, 3, u32::MAX, 1..=1),
        LootEntry::new(VitalityElixir, 4.0, 1, u32::MAX, 1..=1),
        LootEntry::new(MightElixir, 3.0, 1, u32::MAX, 1..=1),
        LootEntry::new(StoneskinElixir, 3.0, 2, u32::MAX, 1..=1),
        LootEntry::new(BulwarkElixir, 3.0, 2, u32::MAX, 1..=1),
        LootEntry::new(TomeOfInsight, 5.0, 1, 2, 1..=1),
        LootEntry::new(AncientTome, 3.0, 3, u32::MAX, 1..=1),
        LootEntry::new(PhoenixFeather, 1.0, 3, u32::MAX, 1..=1),
        LootEntry::new(GoldCoin, 12.0, 1, u32::MAX, 5..=25),
        LootEntry::new(Gemstone, 6.0, 1, u32::MAX, 1..=3),
        LootEntry::new(MithrilOre, 4.0, 2, u32::MAX, 1..=3),
        LootEntry::new(StarMetal, 2.0, 4, u32::MAX, 1..=2),
        LootEntry::new(DragonScale, 2.0, 3, u32::MAX, 1..=2),
        LootEntry::new(VoidEssence, 1.0, 5, u32::MAX, 1..=1),
        LootEntry::new(TitanShard, 4.0, 1, u32::MAX, 1..=3),
    ]
}

pub fn unique_loot_table() -> Vec<ItemType> {
    use ItemType::*;
    vec![
        CrownOfTheFallen,
        HeartOfTheDepths,
        EmberCore,
        FrostCore,
        StormCore,
        ShadowCore,
        AncientRelic,
    ]
}

/// Boss kill rewards
pub struct BossLoot;

impl BossLoot {
    pub fn global_rolls(tier: u32) -> u32 {
        1 + tier / 2
    }

    pub fn equipment_rolls(tier: u32) -> u32 {
        1 + tier / 2
    }

    /// 0.35 base, +0.10 per tier above the first, capped at 0.9
    pub fn unique_chance(tier: u32) -> f64 {
        (0.35 + 0.10 * tier.saturating_sub(1) as f64).min(0.9)
    }

    pub fn roll<R: Rng + ?Sized>(tier: u32, catalog: &TemplateCatalog, rng: &mut R) -> Vec<LootDrop> {
        let mut drops = Vec::new();

        let table: Vec<LootEntry> = global_loot_table()
            .into_iter()
            .filter(|e| e.allows(tier))
            .collect();
        for _ in 0..Self::global_rolls(tier) {
            if let Some(entry) = roll_weighted(&table, |e| e.weight, rng) {
                let quantity = rng.random_range(entry.quantity.clone());
                drops.push(LootDrop::consumable(entry.item_type, quantity));
            }
        }

        if rng.random_bool(Self::unique_chance(tier)) {
            let uniques = unique_loot_table();
            if let Some(unique) = roll_weighted(&uniques, |_| 1.0, rng) {
                drops.push(LootDrop::consumable(*unique, 1));
            }
        }

        let equivalent_depth = tier * 5;
        for _ in 0..Self::equipment_rolls(tier) {
            if let Some(key) = EquipmentDrops::roll_equipment(equivalent_depth, catalog, rng) {
                drops.push(LootDrop::equipment(key));
            }
        }

        tracing::debug!("Boss loot (tier {}) rolled {} drops", tier, drops.len());
        drops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn boundary_roll_is_inclusive() {
        let weights = [6.0, 6.0, 5.0];
        let picked = pick_by_roll(&weights, |w| *w, 6.0);
        assert!(std::ptr::eq(picked.unwrap(), &weights[0]));

        let picked = pick_by_roll(&weights, |w| *w, 6.5);
        assert!(std::ptr::eq(picked.unwrap(), &weights[1]));
    }

    #[test]
    fn overshoot_falls_back_to_last() {
        let weights = [1.0, 2.0];
        let picked = pick_by_roll(&weights, |w| *w, 3.0000001);
        assert!(std::ptr::eq(picked.unwrap(), &weights[1]));
    }

    #[test]
    fn empty_table_rolls_nothing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let empty: [f64; 0] = [];
        assert!(roll_weighted(&empty, |w| *w, &mut rng).is_none());
    }

    #[test]
    fn unique_chance_is_capped() {
        assert!((BossLoot::unique_chance(1) - 0.35).abs() < 1e-9);
        assert_eq!(BossLoot::unique_chance(20), 0.9);
    }

    #[test]
    fn boss_loot_has_minimum_bundle() {
        let catalog = TemplateCatalog::new();
        let mut rng = Pcg32::seed_from_u64(42);
        let drops = BossLoot::roll(2, &catalog, &mut rng);
        let equipment = drops.iter().filter(|d| d.equipment.is_some()).count();
        assert_eq!(equipment as u32, BossLoot::equipment_rolls(2));
        assert!(drops.len() as u32 >= BossLoot::global_rolls(2) + BossLoot::equipment_rolls(2));
    }

    #[test]
    fn global_table_respects_tier_gates() {
        let tier_one: Vec<_> = global_loot_table().into_iter().filter(|e| e.allows(1)).collect();
        assert!(tier_one.iter().all(|e| e.item_type != ItemType::VoidEssence));
    }

    #[test]
    fn shallow_equipment_stays_in_band() {
        let catalog = TemplateCatalog::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let band = DepthBand::for_depth(2);
        for _ in 0..50 {
            let key = EquipmentDrops::roll_equipment(2, &catalog, &mut rng).unwrap();
            assert!(key.material() >= band.min_tier && key.material() <= band.max_tier);
        }
    }

    #[test]
    fn equipment_kind_comes_from_the_first_draw() {
        let catalog = TemplateCatalog::new();
        for seed in 0..32 {
            let expect_weapon = Pcg32::seed_from_u64(seed).random_bool(0.5);
            let mut rng = Pcg32::seed_from_u64(seed);
            let key = EquipmentDrops::roll_equipment(2, &catalog, &mut rng).unwrap();
            assert_eq!(key.is_weapon(), expect_weapon, "seed {seed}");
        }
    }
}
