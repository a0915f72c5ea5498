// src/hero/src/mutation_manager.rs
use rand::Rng;
use rand::seq::IndexedRandom;
use std::ops::RangeInclusive;

use crate::mutation::{Mutation, MutationState, MutationTier, pool_for_tier};

/// Tier probabilities per level band (Common..Legendary)
const TIER_WEIGHTS: [(u32, [f64; 5]); 5] = [
    (3, [0.70, 0.25, 0.05, 0.00, 0.00]),
    (7, [0.50, 0.33, 0.14, 0.03, 0.00]),
    (12, [0.30, 0.35, 0.25, 0.08, 0.02]),
    (17, [0.15, 0.30, 0.32, 0.17, 0.06]),
    (u32::MAX, [0.05, 0.20, 0.35, 0.28, 0.12]),
];

pub fn tier_weights_for_level(level: u32) -> [f64; 5] {
    TIER_WEIGHTS
        .iter()
        .find(|(max_level, _)| level <= *max_level)
        .map(|(_, weights)| *weights)
        .unwrap_or(TIER_WEIGHTS[TIER_WEIGHTS.len() - 1].1)
}

/// Rolls level-up mutation offers
#[derive(Clone, Debug)]
pub struct MutationManager {
    choice_range: RangeInclusive<usize>,
}

impl Default for MutationManager {
    fn default() -> Self {
        Self::new(2..=2)
    }
}

impl MutationManager {
    pub fn new(choice_range: RangeInclusive<usize>) -> Self {
        Self { choice_range }
    }

    pub fn roll_tier<R: Rng + ?Sized>(&self, level: u32, rng: &mut R) -> MutationTier {
        let weights = tier_weights_for_level(level);
        let total: f64 = weights.iter().sum();
        let roll = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        for (tier, weight) in MutationTier::ALL.iter().zip(weights) {
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            if roll <= cumulative {
                return *tier;
            }
        }
        MutationTier::Common
    }

    /// Offer up to the configured number of distinct mutations. Prefers ones
    /// the player lacks; gives up after `desired * 10` attempts.
    pub fn roll_choices<R: Rng + ?Sized>(
        &self,
        level: u32,
        owned: &MutationState,
        rng: &mut R,
    ) -> Vec<&'static Mutation> {
        let desired = rng.random_range(self.choice_range.clone());
        let mut offered: Vec<&'static Mutation> = Vec::with_capacity(desired);
        let max_attempts = desired * 10;
        let mut attempts = 0;

        while offered.len() < desired && attempts < max_attempts {
            attempts += 1;
            let tier = self.roll_tier(level, rng);
            let not_offered = |m: &&'static Mutation| !offered.iter().any(|o| o.id == m.id);

            let fresh: Vec<&'static Mutation> = pool_for_tier(tier)
                .filter(not_offered)
                .filter(|m| !owned.has(m.id))
                .collect();
            let candidates: Vec<&'static Mutation> = if fresh.is_empty() {
                pool_for_tier(tier).filter(not_offered).collect()
            } else {
                fresh
            };

            if let Some(pick) = candidates.choose(rng) {
                offered.push(*pick);
            }
        }

        tracing::debug!(
            "Rolled {} of {} mutation choices at level {} in {} attempts",
            offered.len(),
            desired,
            level,
            attempts
        );
        offered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat::RunRng;

    #[test]
    fn seeded_tier_sequence_is_stable() {
        use MutationTier::*;
        let manager = MutationManager::default();
        let mut rng = RunRng::new(2024);

        let rolled: Vec<(u32, Vec<MutationTier>)> = [2, 6, 10, 15, 20]
            .into_iter()
            .map(|level| (level, (0..4).map(|_| manager.roll_tier(level, &mut rng)).collect()))
            .collect();
        assert_eq!(
            rolled,
            vec![
                (2, vec![Common, Common, Uncommon, Uncommon]),
                (6, vec![Rare, Common, Uncommon, Epic]),
                (10, vec![Rare, Rare, Rare, Common]),
                (15, vec![Common, Rare, Uncommon, Uncommon]),
                (20, vec![Uncommon, Rare, Legendary, Rare]),
            ]
        );
    }

    #[test]
    fn seeded_offers_are_stable() {
        let manager = MutationManager::default();
        let state = MutationState::default();
        let mut rng = RunRng::new(2024);

        let offers: Vec<Vec<&str>> = [2, 10, 20]
            .into_iter()
            .map(|level| manager.roll_choices(level, &state, &mut rng).iter().map(|m| m.id).collect())
            .collect();
        assert_eq!(
            offers,
            vec![
                vec!["keen_mind", "dense_hide"],
                vec!["toxic_blood", "shadow_step"],
                vec!["void_skin", "iron_hide"],
            ]
        );

        let mut owned = MutationState::default();
        owned.acquired_mutation_ids.insert("keen_mind".to_string());
        owned.acquired_mutation_ids.insert("dense_hide".to_string());
        let ids: Vec<&str> = manager
            .roll_choices(2, &owned, &mut RunRng::new(2024))
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["venom_glands", "troll_blood"]);
    }

    #[test]
    fn low_levels_never_roll_top_tiers() {
        let manager = MutationManager::default();
        let mut rng = RunRng::new(7);
        for _ in 0..2000 {
            let tier = manager.roll_tier(2, &mut rng);
            assert!(tier < MutationTier::Epic);
        }
    }

    #[test]
    fn offers_are_distinct() {
        let manager = MutationManager::new(3..=3);
        let state = MutationState::default();
        let mut rng = RunRng::new(11);
        for _ in 0..100 {
            let choices = manager.roll_choices(1, &state, &mut rng);
            let mut ids: Vec<_> = choices.iter().map(|m| m.id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), choices.len());
        }
    }

    #[test]
    fn exhausted_pools_degrade_gracefully() {
        // Level 1 can only reach the first three tiers; ask for more than exist
        let manager = MutationManager::new(40..=40);
        let state = MutationState::default();
        let mut rng = RunRng::new(3);
        let choices = manager.roll_choices(1, &state, &mut rng);
        assert!(choices.len() < 40);
        assert!(!choices.is_empty());
    }

    #[test]
    fn band_lookup() {
        assert_eq!(tier_weights_for_level(1)[0], 0.70);
        assert_eq!(tier_weights_for_level(7)[3], 0.03);
        assert_eq!(tier_weights_for_level(18)[4], 0.12);
    }
}
