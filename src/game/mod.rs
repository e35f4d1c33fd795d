//! Public table operations, their notifications and the staged-commit game state.

pub mod game_manager;
pub mod notifications;

pub use game_manager::*;
pub use notifications::*;
