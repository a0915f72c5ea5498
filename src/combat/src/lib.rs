// src/combat/src/lib.rs
//! Grid primitives, combat math, vision and foe catalogs shared by every
//! other crate in the workspace.

pub mod boss;
pub mod enemy;
pub mod position;
pub mod rng;
pub mod stats;
pub mod vision;

pub use crate::boss::{BossData, BossManager, BossType, ScaledBoss};
pub use crate::enemy::{BehaviorType, EnemyScalingConfig, EnemyState, Intent, KillKind, Routine};
pub use crate::position::{Direction, Position};
pub use crate::rng::RunRng;
pub use crate::stats::{DamageOutcome, Stats};
pub use crate::vision::VisionSystem;

/// Handles combat interactions between entities
pub struct Combat;

mod constants {
    pub const MIN_DAMAGE: u32 = 1;
}

/// Result of a resolved hit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitResult {
    pub damage: u32,
    pub outcome: DamageOutcome,
    pub killed: bool,
}

impl Combat {
    /// `max(1, attack - defense)`
    pub fn damage(attack: u32, defense: u32) -> u32 {
        attack.saturating_sub(defense).max(constants::MIN_DAMAGE)
    }

    /// Flat reduction applied after the base formula; still at least 1
    pub fn reduce(damage: u32, reduction: u32) -> u32 {
        damage.saturating_sub(reduction).max(constants::MIN_DAMAGE)
    }

    /// Resolve a hit of `damage` against `target` (armor first, then hp)
    pub fn apply(target: &mut Stats, damage: u32) -> HitResult {
        let outcome = target.take_damage(damage);
        HitResult {
            damage,
            outcome,
            killed: target.is_dead(),
        }
    }
}
