use std::collections::HashMap;
use std::fmt;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::Card;
use crate::ledger::types::{HandNumber, PlayerId, TableId};

const DOMAIN_COMMIT: &[u8] = b"veiled-poker/card-commitment/v1";

/// Per-hand secret that blinds a player's card commitments.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RevealKey([u8; 32]);

impl RevealKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for RevealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RevealKey(..)")
    }
}

/// Everything a commitment is bound to besides the reveal key and the card itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentContext {
    pub table_id: TableId,
    pub hand: HandNumber,
    pub player: PlayerId,
    /// 0 for the first hole card, 1 for the second.
    pub slot: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardCommitment([u8; 32]);

impl CardCommitment {
    /// SHA-256 over the domain tag, the context, the reveal key and the card value.
    pub fn compute(context: &CommitmentContext, reveal_key: &RevealKey, card: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_COMMIT);
        hasher.update(context.table_id.to_be_bytes());
        hasher.update(context.hand.to_be_bytes());
        hasher.update(context.player.to_be_bytes());
        hasher.update([context.slot]);
        hasher.update(reveal_key.as_bytes());
        hasher.update(card.to_be_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn matches(&self, context: &CommitmentContext, reveal_key: &RevealKey, card: Card) -> bool {
        *self == Self::compute(context, reveal_key, u32::from(card.code()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for CardCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardCommitment({})", hex::encode(self.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCardCommitment {
    pub card1_hash: CardCommitment,
    pub card2_hash: CardCommitment,
}

impl PlayerCardCommitment {
    /// Both revealed cards must match, in dealing order.
    pub fn verify(
        &self,
        table_id: TableId,
        hand: HandNumber,
        player: PlayerId,
        reveal_key: &RevealKey,
        cards: &[Card; 2],
    ) -> bool {
        let context = |slot| CommitmentContext {
            table_id,
            hand,
            player,
            slot,
        };
        self.card1_hash.matches(&context(0), reveal_key, cards[0])
            && self.card2_hash.matches(&context(1), reveal_key, cards[1])
    }
}

/// Write-once commitments keyed by (player, table, hand).
#[derive(Clone, Debug, Default)]
pub struct CommitmentStore {
    entries: HashMap<(PlayerId, TableId, HandNumber), PlayerCardCommitment>,
}

impl CommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a commitment. Returns `false` and leaves the stored value untouched if one was
    /// already written for the key.
    pub fn record(
        &mut self,
        player: PlayerId,
        table_id: TableId,
        hand: HandNumber,
        commitment: PlayerCardCommitment,
    ) -> bool {
        match self.entries.entry((player, table_id, hand)) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(commitment);
                true
            }
        }
    }

    pub fn get(
        &self,
        player: PlayerId,
        table_id: TableId,
        hand: HandNumber,
    ) -> Option<&PlayerCardCommitment> {
        self.entries.get(&(player, table_id, hand))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
