use std::collections::HashMap;

use super::errors::*;
use super::types::*;
use crate::ledger::types::{RoundIndex, TableId};

/// Rounds keyed by (table, street). Superseded wholesale when a hand ends.
#[derive(Clone, Debug)]
pub struct RoundBook<C> {
    rounds: HashMap<RoundKey, Round<C>>,
}

impl<C> Default for RoundBook<C> {
    fn default() -> Self {
        Self {
            rounds: HashMap::new(),
        }
    }
}

impl<C> RoundBook<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table_id: TableId, round_index: RoundIndex) -> Option<&Round<C>> {
        self.rounds.get(&(table_id, round_index))
    }

    pub fn get_mut(&mut self, table_id: TableId, round_index: RoundIndex) -> Option<&mut Round<C>> {
        self.rounds.get_mut(&(table_id, round_index))
    }

    pub fn insert(&mut self, table_id: TableId, round_index: RoundIndex, round: Round<C>) {
        self.rounds.insert((table_id, round_index), round);
    }

    pub fn clear_table(&mut self, table_id: TableId) {
        self.rounds.retain(|(table, _), _| *table != table_id);
    }

    pub fn rounds_for(&self, table_id: TableId) -> usize {
        self.rounds.keys().filter(|(table, _)| *table == table_id).count()
    }
}

impl<C> InvariantCheck for Round<C> {
    fn validate_invariants(&self) -> Result<(), StateError> {
        if self.players.len() != self.chips.len() || self.players.len() != self.acted.len() {
            return Err(StateError::InvariantViolation("round vectors misaligned"));
        }
        if !self.players.is_empty() && self.turn >= self.players.len() {
            return Err(StateError::InvariantViolation("turn out of range"));
        }
        for (i, player) in self.players.iter().enumerate() {
            if self.players[i + 1..].contains(player) {
                return Err(StateError::InvariantViolation("duplicate player in round"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encrypted::{ClearBackend, EncryptedBackend};

    #[test]
    fn misaligned_round_is_rejected() {
        let backend = ClearBackend::new(Some(1));
        let mut round = Round::open(&backend, vec![1, 2], backend.trivial(0));
        assert!(round.validate_invariants().is_ok());

        round.chips.pop();
        assert_eq!(
            round.validate_invariants(),
            Err(StateError::InvariantViolation("round vectors misaligned"))
        );
    }

    #[test]
    fn clear_table_leaves_other_tables() {
        let backend = ClearBackend::new(Some(2));
        let mut book = RoundBook::new();
        book.insert(0, 0, Round::open(&backend, vec![1, 2], backend.trivial(0)));
        book.insert(0, 1, Round::open(&backend, vec![1, 2], backend.trivial(0)));
        book.insert(1, 0, Round::open(&backend, vec![3, 4], backend.trivial(0)));

        book.clear_table(0);
        assert_eq!(book.rounds_for(0), 0);
        assert!(book.get(1, 0).is_some());
    }
}
