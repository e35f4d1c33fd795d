use serde::{Deserialize, Serialize};

use crate::encrypted::EncryptedBackend;
use crate::ledger::types::{PlayerId, RoundIndex, TableId};

pub type RoundKey = (TableId, RoundIndex);

/// Betting state of one street.
///
/// `players`, `chips` and `acted` are positionally aligned: `chips[i]` is the encrypted amount
/// `players[i]` has put in on this street.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round<C> {
    pub active: bool,
    /// Index into `players` of the player to act.
    pub turn: usize,
    pub players: Vec<PlayerId>,
    pub highest_chip: C,
    pub chips: Vec<C>,
    pub acted: Vec<bool>,
}

impl<C: Clone> Round<C> {
    /// A street with zeroed contributions and nobody to have acted yet.
    pub fn open<B>(backend: &B, players: Vec<PlayerId>, highest_chip: C) -> Self
    where
        B: EncryptedBackend<Cipher = C>,
    {
        let chips = players.iter().map(|_| backend.trivial(0)).collect();
        let acted = vec![false; players.len()];
        Self {
            active: true,
            turn: 0,
            players,
            highest_chip,
            chips,
            acted,
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn position(&self, player: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| *p == player)
    }

    pub fn everyone_acted(&self) -> bool {
        self.acted.iter().all(|acted| *acted)
    }

    /// Swap-with-last removal from every aligned vector. Returns the removed contribution.
    pub fn remove_at(&mut self, index: usize) -> (PlayerId, C) {
        let player = self.players.swap_remove(index);
        let chips = self.chips.swap_remove(index);
        self.acted.swap_remove(index);
        (player, chips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encrypted::{ClearBackend, Handle};
    use crate::test_utils::serde::assert_round_trip_eq;

    #[test]
    fn opened_round_is_aligned_and_zeroed() {
        let backend = ClearBackend::new(Some(1));
        let round = Round::open(&backend, vec![10, 11, 12], backend.trivial(0));
        assert_eq!(round.chips.len(), 3);
        assert_eq!(round.acted, vec![false; 3]);
        assert!(round.chips.iter().all(|c| backend.reveal(c).unwrap() == 0));
        assert_eq!(round.turn, 0);
        assert!(round.active);
    }

    #[test]
    fn remove_at_swaps_with_last() {
        let backend = ClearBackend::new(Some(2));
        let mut round = Round::open(&backend, vec![10, 11, 12, 13], backend.trivial(0));
        round.chips[1] = backend.encrypt(7);
        round.acted[3] = true;

        let (player, chips) = round.remove_at(1);
        assert_eq!(player, 11);
        assert_eq!(backend.reveal(&chips).unwrap(), 7);
        assert_eq!(round.players, vec![10, 13, 12]);
        assert_eq!(round.acted, vec![false, true, false]);
        assert_eq!(round.chips.len(), 3);
    }

    #[test]
    fn round_round_trips_with_serde() {
        let backend = ClearBackend::new(Some(3));
        let round: Round<Handle> = Round::open(&backend, vec![1, 2], backend.trivial(10));
        assert_round_trip_eq(&round);
    }
}
