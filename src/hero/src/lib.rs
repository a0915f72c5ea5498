// src/hero/src/lib.rs
//! Player progression: inventory, equipment, experience and mutations.

pub mod experience;
pub mod inventory;
pub mod mutation;
pub mod mutation_manager;
pub mod player;

pub use self::{
    experience::{DefaultStatGrowth, LevelUpHook, total_xp_for_level, xp_to_next_level},
    inventory::{Inventory, InventoryError},
    mutation::{
        MUTATIONS, Mutation, MutationEffect, MutationError, MutationState, MutationTier, mutation_by_id,
    },
    mutation_manager::MutationManager,
    player::{EquipOutcome, LevelUp, PlayerState},
};
