// src/combat/src/stats.rs

use serde::{Deserialize, Serialize};

/// Combat attributes shared by the player and every enemy.
///
/// Invariants: `hp <= max_hp` and `armor <= max_armor`. All mutators keep
/// them; fields stay public for snapshot restore and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub max_hp: u32,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub max_armor: u32,
    pub armor: u32,
}

/// How a single hit was split between armor and hit points
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    pub absorbed: u32,
    pub hp_lost: u32,
}

impl Stats {
    /// Full-health stat block without armor
    pub fn new(max_hp: u32, attack: u32, defense: u32) -> Self {
        Self {
            max_hp,
            hp: max_hp,
            attack,
            defense,
            max_armor: 0,
            armor: 0,
        }
    }

    pub fn with_armor(mut self, max_armor: u32) -> Self {
        self.max_armor = max_armor;
        self.armor = max_armor;
        self
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Armor soaks first (up to its current value), the remainder reduces hp.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        let absorbed = amount.min(self.armor);
        self.armor -= absorbed;
        let remainder = amount - absorbed;
        let hp_lost = remainder.min(self.hp);
        self.hp -= hp_lost;
        DamageOutcome { absorbed, hp_lost }
    }

    /// Returns the amount actually restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }

    pub fn heal_full(&mut self) {
        self.hp = self.max_hp;
    }

    pub fn restore_armor(&mut self, amount: u32) -> u32 {
        let before = self.armor;
        self.armor = self.armor.saturating_add(amount).min(self.max_armor);
        self.armor - before
    }

    /// Raises max hp and heals by the same amount
    pub fn raise_max_hp(&mut self, amount: u32) {
        self.max_hp = self.max_hp.saturating_add(amount);
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }

    /// Adjusts max armor by a signed delta; gained capacity arrives filled.
    pub fn adjust_max_armor(&mut self, delta: i64) {
        let new_max = (self.max_armor as i64 + delta).max(0) as u32;
        if delta > 0 {
            self.armor = self.armor.saturating_add(delta as u32);
        }
        self.max_armor = new_max;
        self.armor = self.armor.min(self.max_armor);
    }
}
