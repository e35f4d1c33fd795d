//! Card codes and the commit-reveal protocol for hole cards.
//!
//! Hole cards never leave the encrypted domain in plaintext. At deal time each card is sealed to
//! the owning player's ElGamal key and only a one-way commitment is kept by the table. At
//! showdown the player hands back the reveal key and the two card codes, and the commitment is
//! recomputed to prove that nothing was swapped.

pub mod commitment;
pub mod seal;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use commitment::{
    CardCommitment, CommitmentContext, CommitmentStore, PlayerCardCommitment, RevealKey,
};
pub use seal::{KeyError, PlayerPublicKey, PlayerSecretKey, SealedCard, SealedRevealKey};

use crate::ledger::types::{HandNumber, PlayerId, TableId};

/// Curve the hole cards are sealed on.
pub type Curve = ark_bn254::G1Projective;

pub const DECK_SIZE: u8 = 52;

/// Card code in `0..52`.
///
/// suit = code / 13 (clubs, diamonds, hearts, spades), rank = code % 13 + 2 (ace = 14).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(pub u8);

impl Card {
    pub fn code(&self) -> u8 {
        self.0
    }

    /// Rank in `2..=14`.
    pub fn rank(&self) -> u8 {
        self.0 % 13 + 2
    }

    /// Suit in `0..4`.
    pub fn suit(&self) -> u8 {
        self.0 / 13
    }

    pub fn is_valid(&self) -> bool {
        self.0 < DECK_SIZE
    }

    pub fn from_rank_suit(rank: u8, suit: u8) -> Self {
        debug_assert!((2..=14).contains(&rank) && suit < 4);
        Card(suit * 13 + (rank - 2))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "??");
        }
        let ranks = [
            "2", "3", "4", "5", "6", "7", "8", "9", "T", "J", "Q", "K", "A",
        ];
        let suits = ["c", "d", "h", "s"];
        write!(
            f,
            "{}{}",
            ranks[(self.rank() - 2) as usize],
            suits[self.suit() as usize]
        )
    }
}

/// Envelope delivered out of band to one player after a deal.
///
/// Only the addressed key-holder can open it; the table retains nothing but the commitments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealtHand {
    pub table_id: TableId,
    pub hand: HandNumber,
    pub player: PlayerId,
    pub cards: [SealedCard; 2],
    pub reveal_key: SealedRevealKey,
}

impl DealtHand {
    /// Opens the envelope. Returns `None` if either card does not decode to a code below
    /// `deck_size`, which is what a wrong secret key produces.
    pub fn open(&self, secret: &PlayerSecretKey, deck_size: u8) -> Option<(RevealKey, [Card; 2])> {
        let first = secret.open_card(&self.cards[0], deck_size)?;
        let second = secret.open_card(&self.cards[1], deck_size)?;
        Some((secret.open_reveal_key(&self.reveal_key), [first, second]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_code_layout() {
        let deuce_clubs = Card(0);
        assert_eq!(deuce_clubs.rank(), 2);
        assert_eq!(deuce_clubs.suit(), 0);

        let ace_spades = Card(51);
        assert_eq!(ace_spades.rank(), 14);
        assert_eq!(ace_spades.suit(), 3);
        assert_eq!(Card::from_rank_suit(14, 3), ace_spades);

        assert!(!Card(52).is_valid());
    }

    #[test]
    fn cards_render_short_names() {
        assert_eq!(Card::from_rank_suit(14, 2).to_string(), "Ah");
        assert_eq!(Card::from_rank_suit(10, 0).to_string(), "Tc");
        assert_eq!(Card(200).to_string(), "??");
    }
}
