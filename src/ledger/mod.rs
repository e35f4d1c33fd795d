pub mod hash;
pub mod serialization;
pub mod state;
pub mod types;

pub use hash::{chain_state_hash, hash_message, Journal, JournalEntry, JournalError};
pub use state::ChipLedger;
pub use types::{HandNumber, PlayerId, RoundIndex, StateHash, TableId, RIVER};
