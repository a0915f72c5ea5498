//! Turn-based dungeon crawler core.
//!
//! The engine is front-end agnostic: feed it `GameAction`s, render the
//! `GameEvent`s it returns. Grid, combat and catalogs live in the member
//! crates; this crate wires them into a playable run.

pub mod action;
pub mod ai;
pub mod config;
pub mod engine;
pub mod event;
pub mod logging;
pub mod turn_system;

pub use action::GameAction;
pub use config::GameConfig;
pub use engine::GameEngine;
pub use event::GameEvent;
pub use turn_system::TurnState;
