// src/hero/src/inventory.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

use items::Item;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("inventory is full")]
    Full,
    #[error("no item with id {0} in inventory")]
    NotFound(u64),
    #[error("item {0} is not equipment")]
    NotEquipment(u64),
    #[error("item {0} is already equipped")]
    AlreadyEquipped(u64),
}

/// Ordered item list with stacking. Slot order is insertion order and every
/// item's `inventory_index` mirrors its slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
    capacity: usize,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// True when `item` would fit, either into an existing stack or a free slot
    pub fn can_accept(&self, item: &Item) -> bool {
        self.items.len() < self.capacity || self.items.iter().any(|i| i.can_stack_with(item))
    }

    /// Adds an item and returns the id it now lives under. A stacked item
    /// merges into the existing stack and its own id is retired.
    pub fn add(&mut self, mut item: Item) -> Result<u64, InventoryError> {
        if let Some(stack) = self.items.iter_mut().find(|i| i.can_stack_with(&item)) {
            stack.quantity += item.quantity;
            return Ok(stack.id);
        }
        if self.items.len() >= self.capacity {
            return Err(InventoryError::Full);
        }
        item.position = None;
        item.inventory_index = Some(self.items.len());
        let id = item.id;
        self.items.push(item);
        Ok(id)
    }

    pub fn get(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Removes a single unit; the slot disappears when its stack empties
    pub fn remove_one(&mut self, id: u64) -> Result<Item, InventoryError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(InventoryError::NotFound(id))?;
        if self.items[index].quantity > 1 {
            self.items[index].quantity -= 1;
            let mut unit = self.items[index].clone();
            unit.quantity = 1;
            unit.inventory_index = None;
            return Ok(unit);
        }
        let removed = self.items.remove(index);
        self.reindex();
        Ok(removed)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total units of a given item type across stacks
    pub fn count_of(&self, item_type: items::ItemType) -> u32 {
        self.items
            .iter()
            .filter(|i| i.item_type == item_type)
            .map(|i| i.quantity)
            .sum()
    }

    fn reindex(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.inventory_index = Some(index);
        }
    }
}
