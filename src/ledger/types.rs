use std::fmt;

use serde::{Deserialize, Serialize};

pub type TableId = u64;
pub type PlayerId = u64;
pub type HandNumber = u64;
/// Street index inside a hand: 0 = preflop, 1 = flop, 2 = turn, 3 = river.
pub type RoundIndex = u8;

pub const RIVER: RoundIndex = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateHash([u8; 32]);

impl StateHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::zero()
    }
}

impl AsRef<[u8; 32]> for StateHash {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for StateHash {
    fn from(bytes: [u8; 32]) -> Self {
        StateHash::new(bytes)
    }
}

impl From<StateHash> for [u8; 32] {
    fn from(hash: StateHash) -> Self {
        hash.0
    }
}

impl fmt::Display for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serde::assert_round_trip_eq;

    #[test]
    fn state_hash_round_trips_with_serde() {
        assert_round_trip_eq(&StateHash::new([7u8; 32]));
    }

    #[test]
    fn state_hash_displays_as_lowercase_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        let rendered = StateHash::from(bytes).to_string();
        assert_eq!(rendered.len(), 64);
        assert!(rendered.starts_with("ab00"));
    }
}
