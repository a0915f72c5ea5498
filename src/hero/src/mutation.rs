// src/hero/src/mutation.rs
use combat::Stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumIter};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("unknown mutation '{0}'")]
    Unknown(String),
    #[error("mutation '{0}' already acquired")]
    AlreadyAcquired(String),
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display,
)]
pub enum MutationTier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl MutationTier {
    pub const ALL: [MutationTier; 5] = [
        MutationTier::Common,
        MutationTier::Uncommon,
        MutationTier::Rare,
        MutationTier::Epic,
        MutationTier::Legendary,
    ];
}

/// What a mutation does when applied
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MutationEffect {
    DodgeBonus(f64),
    DamageReduction(u32),
    ResurrectionCharge(u32),
    PoisonChanceOnHit(f64),
    MaxHp(u32),
    Attack(u32),
    Defense(u32),
    MaxArmor(u32),
    HealOnKill(u32),
    XpBonus(u32),
    Regeneration(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mutation {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tier: MutationTier,
    pub effect: MutationEffect,
}

const fn mutation(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    tier: MutationTier,
    effect: MutationEffect,
) -> Mutation {
    Mutation {
        id,
        name,
        description,
        tier,
        effect,
    }
}

pub const MUTATIONS: &[Mutation] = &[
    mutation("thick_skin", "Thick Skin", "+5 max HP", MutationTier::Common, MutationEffect::MaxHp(5)),
    mutation("sharp_claws", "Sharp Claws", "+1 attack", MutationTier::Common, MutationEffect::Attack(1)),
    mutation("hardened_scales", "Hardened Scales", "+1 defense", MutationTier::Common, MutationEffect::Defense(1)),
    mutation("quick_reflexes", "Quick Reflexes", "5% chance to dodge", MutationTier::Common, MutationEffect::DodgeBonus(0.05)),
    mutation("bone_plating", "Bone Plating", "+3 max armor", MutationTier::Common, MutationEffect::MaxArmor(3)),
    mutation("venom_glands", "Venom Glands", "15% chance to poison on hit", MutationTier::Uncommon, MutationEffect::PoisonChanceOnHit(0.15)),
    mutation("keen_mind", "Keen Mind", "+10% experience", MutationTier::Uncommon, MutationEffect::XpBonus(10)),
    mutation("vampiric_bite", "Vampiric Bite", "Heal 3 HP per kill", MutationTier::Uncommon, MutationEffect::HealOnKill(3)),
    mutation("troll_blood", "Troll Blood", "Regenerate 1 HP per turn", MutationTier::Uncommon, MutationEffect::Regeneration(1)),
    mutation("dense_hide", "Dense Hide", "Reduce incoming damage by 1", MutationTier::Uncommon, MutationEffect::DamageReduction(1)),
    mutation("chitin_shell", "Chitin Shell", "+8 max armor", MutationTier::Rare, MutationEffect::MaxArmor(8)),
    mutation("predator_instinct", "Predator Instinct", "+3 attack", MutationTier::Rare, MutationEffect::Attack(3)),
    mutation("shadow_step", "Shadow Step", "12% chance to dodge", MutationTier::Rare, MutationEffect::DodgeBonus(0.12)),
    mutation("toxic_blood", "Toxic Blood", "30% chance to poison on hit", MutationTier::Rare, MutationEffect::PoisonChanceOnHit(0.30)),
    mutation("titan_heart", "Titan Heart", "+25 max HP", MutationTier::Epic, MutationEffect::MaxHp(25)),
    mutation("iron_hide", "Iron Hide", "Reduce incoming damage by 2", MutationTier::Epic, MutationEffect::DamageReduction(2)),
    mutation("ancestral_memory", "Ancestral Memory", "+25% experience", MutationTier::Epic, MutationEffect::XpBonus(25)),
    mutation("phoenix_soul", "Phoenix Soul", "Survive one lethal blow", MutationTier::Legendary, MutationEffect::ResurrectionCharge(1)),
    mutation("apex_predator", "Apex Predator", "+6 attack", MutationTier::Legendary, MutationEffect::Attack(6)),
    mutation("void_skin", "Void Skin", "20% chance to dodge", MutationTier::Legendary, MutationEffect::DodgeBonus(0.20)),
];

pub fn mutation_by_id(id: &str) -> Option<&'static Mutation> {
    MUTATIONS.iter().find(|m| m.id == id)
}

pub fn pool_for_tier(tier: MutationTier) -> impl Iterator<Item = &'static Mutation> {
    MUTATIONS.iter().filter(move |m| m.tier == tier)
}

/// Accumulated mutation bonuses. Stat-raising mutations go straight into
/// `Stats`; everything else lives here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationState {
    pub dodge_bonus: f64,
    pub damage_reduction: u32,
    pub resurrection_charges: u32,
    pub poison_chance_on_hit: f64,
    pub heal_on_kill: u32,
    pub xp_bonus_percent: u32,
    pub regeneration: u32,
    pub acquired_mutation_ids: BTreeSet<String>,
}

pub const MAX_DODGE: f64 = 0.75;

impl MutationState {
    pub fn has(&self, id: &str) -> bool {
        self.acquired_mutation_ids.contains(id)
    }

    pub fn dodge_chance(&self) -> f64 {
        self.dodge_bonus.clamp(0.0, MAX_DODGE)
    }

    /// XP after the percentage bonus, rounded down
    pub fn scaled_xp(&self, amount: u32) -> u32 {
        amount + amount * self.xp_bonus_percent / 100
    }

    /// Applies `mutation` once. Re-applying an acquired id is rejected.
    pub fn apply(&mut self, mutation: &Mutation, stats: &mut Stats) -> Result<(), MutationError> {
        if self.has(mutation.id) {
            return Err(MutationError::AlreadyAcquired(mutation.id.to_string()));
        }
        match mutation.effect {
            MutationEffect::DodgeBonus(v) => self.dodge_bonus += v,
            MutationEffect::DamageReduction(v) => self.damage_reduction += v,
            MutationEffect::ResurrectionCharge(v) => self.resurrection_charges += v,
            MutationEffect::PoisonChanceOnHit(v) => {
                self.poison_chance_on_hit = (self.poison_chance_on_hit + v).min(1.0)
            }
            MutationEffect::MaxHp(v) => stats.raise_max_hp(v),
            MutationEffect::Attack(v) => stats.attack += v,
            MutationEffect::Defense(v) => stats.defense += v,
            MutationEffect::MaxArmor(v) => stats.adjust_max_armor(v as i64),
            MutationEffect::HealOnKill(v) => self.heal_on_kill += v,
            MutationEffect::XpBonus(v) => self.xp_bonus_percent += v,
            MutationEffect::Regeneration(v) => self.regeneration += v,
        }
        self.acquired_mutation_ids.insert(mutation.id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let ids: HashSet<_> = MUTATIONS.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), MUTATIONS.len());
        for tier in MutationTier::ALL {
            assert!(pool_for_tier(tier).count() >= 3, "{tier} pool too small");
        }
    }

    #[test]
    fn apply_records_and_rejects_repeat() {
        let mut state = MutationState::default();
        let mut stats = Stats::new(30, 4, 1);
        let heart = mutation_by_id("titan_heart").unwrap();

        state.apply(heart, &mut stats).unwrap();
        assert_eq!(stats.max_hp, 55);
        assert!(state.has("titan_heart"));

        assert_eq!(
            state.apply(heart, &mut stats),
            Err(MutationError::AlreadyAcquired("titan_heart".into()))
        );
        assert_eq!(stats.max_hp, 55);
    }

    #[test]
    fn xp_bonus_is_percentage() {
        let state = MutationState {
            xp_bonus_percent: 25,
            ..Default::default()
        };
        assert_eq!(state.scaled_xp(40), 50);
    }
}
