//! Run lifecycle and meta progression
//!
//! `RunManager` tracks the one active run and the counters fed by game
//! events; `RunEndManager` turns a finished run into Titan Shards on the
//! persistent `MetaProfile`.

pub mod manager;
pub mod meta;
pub mod state;

#[cfg(test)]
mod tests;

pub use manager::{FloorTransition, RunHooks, RunManager};
pub use meta::{ASHEN_DEPTHS, MetaError, MetaProfile, MetaUpgrade, RunEndManager, RunReward, StartingBonuses};
pub use state::{DEFAULT_REGION, FloorInfo, RunPhase, RunResult, RunState, is_boss_floor};
