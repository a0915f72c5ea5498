// src/hero/src/experience.rs
use combat::Stats;

/// Cumulative XP needed to leave level `n`: `30n² + 90n`
pub fn total_xp_for_level(level: u32) -> u32 {
    30 * level * level + 90 * level
}

/// XP between consecutive thresholds
pub fn xp_to_next_level(level: u32) -> u32 {
    total_xp_for_level(level + 1) - total_xp_for_level(level)
}

/// Per-level stat growth, swappable for tests or alternate classes
pub trait LevelUpHook {
    fn on_level_up(&self, new_level: u32, stats: &mut Stats);
}

/// +5 max HP, heal to full, +1 attack
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStatGrowth;

impl LevelUpHook for DefaultStatGrowth {
    fn on_level_up(&self, _new_level: u32, stats: &mut Stats) {
        stats.raise_max_hp(5);
        stats.heal_full();
        stats.attack += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn curve_values() {
        assert_eq!(total_xp_for_level(1), 120);
        assert_eq!(total_xp_for_level(2), 300);
        assert_eq!(xp_to_next_level(1), 180);
    }

    #[test]
    fn default_growth() {
        let mut stats = Stats::new(30, 4, 1);
        stats.hp = 3;
        DefaultStatGrowth.on_level_up(2, &mut stats);
        assert_eq!((stats.max_hp, stats.hp, stats.attack), (35, 35, 5));
    }

    proptest! {
        #[test]
        fn consecutive_gap_is_linear(n in 1u32..1000) {
            prop_assert_eq!(xp_to_next_level(n), 60 * n + 120);
        }
    }
}
