// src/hero/src/player.rs
use combat::Stats;
use items::ArmorSlot;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::experience::{LevelUpHook, total_xp_for_level};
use crate::inventory::{Inventory, InventoryError};
use crate::mutation::{MutationError, MutationState, mutation_by_id};
use crate::mutation_manager::MutationManager;

/// One level gained by `gain_xp`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelUp {
    pub level: u32,
    pub choices: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquipOutcome {
    pub name: String,
    pub replaced: Option<u64>,
}

/// Player-specific payload. Stats live on the owning entity and are passed in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub level: u32,
    /// Lifetime total, never reset on level-up
    pub experience: u32,
    pub inventory: Inventory,
    pub equipped_weapon_id: Option<u64>,
    pub equipped_armor_by_slot: BTreeMap<ArmorSlot, u64>,
    pub mutation_state: MutationState,
    /// Offers not yet chosen, oldest first
    #[serde(default)]
    pub pending_mutation_choices: VecDeque<Vec<String>>,
}

impl PlayerState {
    pub fn new(inventory_capacity: usize) -> Self {
        Self {
            level: 1,
            experience: 0,
            inventory: Inventory::new(inventory_capacity),
            equipped_weapon_id: None,
            equipped_armor_by_slot: BTreeMap::new(),
            mutation_state: MutationState::default(),
            pending_mutation_choices: VecDeque::new(),
        }
    }

    /// Adds XP and resolves every level-up it unlocks
    pub fn gain_xp<R: Rng + ?Sized>(
        &mut self,
        amount: u32,
        stats: &mut Stats,
        hook: &dyn LevelUpHook,
        mutations: Option<&MutationManager>,
        rng: &mut R,
    ) -> Vec<LevelUp> {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = Vec::new();

        while self.experience >= total_xp_for_level(self.level) {
            self.level += 1;
            hook.on_level_up(self.level, stats);

            let mut choices: Vec<String> = match mutations {
                Some(manager) => manager
                    .roll_choices(self.level, &self.mutation_state, rng)
                    .into_iter()
                    .map(|m| m.id.to_string())
                    .collect(),
                None => Vec::new(),
            };
            // Owned-only offers cannot be taken
            if self.is_spent(&choices) {
                choices.clear();
            }
            if !choices.is_empty() {
                self.pending_mutation_choices.push_back(choices.clone());
            }
            tracing::debug!("Player reached level {}", self.level);
            gained.push(LevelUp {
                level: self.level,
                choices,
            });
        }

        gained
    }

    /// Applies a mutation from the oldest pending offer and drops that offer
    pub fn choose_mutation(&mut self, id: &str, stats: &mut Stats) -> Result<(), MutationError> {
        let offered = self
            .pending_mutation_choices
            .front()
            .is_some_and(|batch| batch.iter().any(|c| c == id));
        if !offered {
            return Err(MutationError::Unknown(id.to_string()));
        }
        let mutation = mutation_by_id(id).ok_or_else(|| MutationError::Unknown(id.to_string()))?;
        self.mutation_state.apply(mutation, stats)?;
        self.pending_mutation_choices.pop_front();
        self.drop_spent_offers();
        Ok(())
    }

    fn is_spent(&self, batch: &[String]) -> bool {
        batch.iter().all(|id| self.mutation_state.has(id))
    }

    /// Discards queued offers whose every choice has since been acquired
    fn drop_spent_offers(&mut self) {
        let pending = std::mem::take(&mut self.pending_mutation_choices);
        self.pending_mutation_choices = pending.into_iter().filter(|batch| !self.is_spent(batch)).collect();
    }

    pub fn is_equipped(&self, item_id: u64) -> bool {
        self.equipped_weapon_id == Some(item_id)
            || self.equipped_armor_by_slot.values().any(|id| *id == item_id)
    }

    /// Equips a weapon or armor piece, swapping out whatever held the slot
    pub fn equip(&mut self, item_id: u64, stats: &mut Stats) -> Result<EquipOutcome, InventoryError> {
        let key = self
            .inventory
            .get(item_id)
            .ok_or(InventoryError::NotFound(item_id))?
            .equipment
            .ok_or(InventoryError::NotEquipment(item_id))?;
        if self.is_equipped(item_id) {
            return Err(InventoryError::AlreadyEquipped(item_id));
        }

        let replaced = if let Some(weapon) = key.weapon_template() {
            let previous = self.equipped_weapon_id.replace(item_id);
            if let Some(old) = previous.and_then(|id| self.unmark(id)) {
                let old_damage = old.weapon_template().map_or(0, |w| w.damage);
                stats.attack = stats.attack.saturating_sub(old_damage);
            }
            stats.attack += weapon.damage;
            previous
        } else if let Some(armor) = key.armor_template() {
            let previous = self.equipped_armor_by_slot.insert(armor.slot, item_id);
            let old_capacity = previous
                .and_then(|id| self.unmark(id))
                .and_then(|old| old.armor_template())
                .map_or(0, |a| a.armor);
            stats.adjust_max_armor(armor.armor as i64 - old_capacity as i64);
            previous
        } else {
            None
        };

        if let Some(item) = self.inventory.get_mut(item_id) {
            item.is_equipped = true;
        }
        Ok(EquipOutcome {
            name: key.display_name(),
            replaced,
        })
    }

    fn unmark(&mut self, item_id: u64) -> Option<items::EquipmentKey> {
        let item = self.inventory.get_mut(item_id)?;
        item.is_equipped = false;
        item.equipment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experience::DefaultStatGrowth;
    use crate::mutation::MUTATIONS;
    use combat::RunRng;
    use items::{ArmorWeight, EquipmentKey, Item, ItemType, MaterialTier, WeaponType};

    fn weapon(id: u64, material: MaterialTier) -> Item {
        Item::equipment(
            id,
            EquipmentKey::Weapon {
                material,
                weapon_type: WeaponType::Sword,
            },
        )
    }

    fn helm(id: u64, material: MaterialTier) -> Item {
        Item::equipment(
            id,
            EquipmentKey::Armor {
                material,
                slot: ArmorSlot::Head,
                weight: ArmorWeight::Medium,
            },
        )
    }

    #[test]
    fn levels_loop_through_multiple_thresholds() {
        let mut player = PlayerState::new(10);
        let mut stats = Stats::new(30, 4, 1);
        let mut rng = RunRng::new(1);

        let ups = player.gain_xp(300, &mut stats, &DefaultStatGrowth, None, &mut rng);
        assert_eq!(ups.len(), 2);
        assert_eq!(player.level, 3);
        assert_eq!(stats.max_hp, 40);
        assert_eq!(stats.attack, 6);
        assert_eq!(player.experience, 300);
    }

    #[test]
    fn level_up_queues_mutation_offer() {
        let mut player = PlayerState::new(10);
        let mut stats = Stats::new(30, 4, 1);
        let mut rng = RunRng::new(8);
        let manager = MutationManager::default();

        let ups = player.gain_xp(120, &mut stats, &DefaultStatGrowth, Some(&manager), &mut rng);
        assert_eq!(ups[0].choices.len(), 2);
        assert_eq!(player.pending_mutation_choices.len(), 1);

        let pick = ups[0].choices[0].clone();
        player.choose_mutation(&pick, &mut stats).unwrap();
        assert!(player.mutation_state.has(&pick));
        assert!(player.pending_mutation_choices.is_empty());
    }

    #[test]
    fn owned_only_offers_are_never_queued() {
        let mut player = PlayerState::new(10);
        let mut stats = Stats::new(30, 4, 1);
        let mut rng = RunRng::new(21);
        player.mutation_state.acquired_mutation_ids =
            MUTATIONS.iter().map(|m| m.id.to_string()).collect();

        // 120, 300 and 540 are crossed
        let manager = MutationManager::default();
        let ups = player.gain_xp(570, &mut stats, &DefaultStatGrowth, Some(&manager), &mut rng);
        assert_eq!(ups.len(), 3);
        assert!(ups.iter().all(|up| up.choices.is_empty()));
        assert!(player.pending_mutation_choices.is_empty());
    }

    #[test]
    fn choosing_drops_offers_that_became_fully_owned() {
        let mut player = PlayerState::new(10);
        let mut stats = Stats::new(30, 4, 1);
        player.mutation_state.acquired_mutation_ids.insert("bone_plating".to_string());
        player
            .pending_mutation_choices
            .push_back(vec!["thick_skin".to_string(), "bone_plating".to_string()]);
        player
            .pending_mutation_choices
            .push_back(vec!["bone_plating".to_string(), "thick_skin".to_string()]);
        player
            .pending_mutation_choices
            .push_back(vec!["thick_skin".to_string(), "chitin_shell".to_string()]);

        player.choose_mutation("thick_skin", &mut stats).unwrap();
        assert_eq!(player.pending_mutation_choices.len(), 1);
        player.choose_mutation("chitin_shell", &mut stats).unwrap();
        assert!(player.pending_mutation_choices.is_empty());
    }

    #[test]
    fn choosing_unoffered_mutation_fails() {
        let mut player = PlayerState::new(10);
        let mut stats = Stats::new(30, 4, 1);
        assert!(matches!(
            player.choose_mutation("thick_skin", &mut stats),
            Err(MutationError::Unknown(_))
        ));
    }

    #[test]
    fn weapon_swap_replaces_bonus() {
        let mut player = PlayerState::new(10);
        let mut stats = Stats::new(30, 4, 1);
        player.inventory.add(weapon(1, MaterialTier::Wood)).unwrap();
        player.inventory.add(weapon(2, MaterialTier::Iron)).unwrap();

        player.equip(1, &mut stats).unwrap();
        assert_eq!(stats.attack, 8);
        let outcome = player.equip(2, &mut stats).unwrap();
        assert_eq!(outcome.replaced, Some(1));
        assert_eq!(stats.attack, 12);
        assert!(!player.inventory.get(1).unwrap().is_equipped);
        assert_eq!(player.equip(2, &mut stats), Err(InventoryError::AlreadyEquipped(2)));
    }

    #[test]
    fn armor_swap_adjusts_capacity_by_delta() {
        let mut player = PlayerState::new(10);
        let mut stats = Stats::new(30, 4, 1);
        player.inventory.add(helm(1, MaterialTier::Wood)).unwrap();
        player.inventory.add(helm(2, MaterialTier::Iron)).unwrap();

        player.equip(1, &mut stats).unwrap();
        assert_eq!(stats.max_armor, 1);
        player.equip(2, &mut stats).unwrap();
        // round(9 * 0.5) = 5 (4.5 rounds away from zero)
        assert_eq!(stats.max_armor, 5);
        assert_eq!(player.equipped_armor_by_slot.get(&ArmorSlot::Head), Some(&2));
    }

    #[test]
    fn consumables_cannot_be_equipped() {
        let mut player = PlayerState::new(10);
        let mut stats = Stats::new(30, 4, 1);
        player.inventory.add(Item::new(7, ItemType::Ration, 1)).unwrap();
        assert_eq!(player.equip(7, &mut stats), Err(InventoryError::NotEquipment(7)));
    }
}
