pub mod cards;
pub mod collaborators;
pub mod config;
pub mod crypto_serde;
pub mod encrypted;
pub mod engine;
pub mod errors;
pub mod game;
pub mod ledger;
pub mod showdown;
pub mod table;

#[cfg(test)]
pub mod test_utils;

pub use errors::{PokerError, PokerResult};
pub use game::{GameManager, GameNotification, HandProgress};
