use std::collections::HashMap;

use crate::encrypted::{EncryptedBackend, EncryptedError};
use crate::ledger::types::{PlayerId, TableId};

// ---- Chip ledger ---------------------------------------------------------------------------

/// Encrypted chip balances keyed by (player, table). Balances persist across hands.
#[derive(Clone, Debug)]
pub struct ChipLedger<C> {
    balances: HashMap<(PlayerId, TableId), C>,
}

impl<C> Default for ChipLedger<C> {
    fn default() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }
}

impl<C: Clone> ChipLedger<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, player: PlayerId, table_id: TableId) -> Option<&C> {
        self.balances.get(&(player, table_id))
    }

    /// The stored balance, or an encrypted zero for a player who never bought in.
    pub fn balance_or_zero<B>(&self, backend: &B, player: PlayerId, table_id: TableId) -> C
    where
        B: EncryptedBackend<Cipher = C>,
    {
        self.balance(player, table_id)
            .cloned()
            .unwrap_or_else(|| backend.trivial(0))
    }

    pub fn credit<B>(
        &mut self,
        backend: &B,
        player: PlayerId,
        table_id: TableId,
        amount: &C,
    ) -> Result<(), EncryptedError>
    where
        B: EncryptedBackend<Cipher = C>,
    {
        let updated = match self.balances.get(&(player, table_id)) {
            Some(current) => backend.add(current, amount)?,
            None => amount.clone(),
        };
        self.balances.insert((player, table_id), updated);
        Ok(())
    }

    /// Subtracts `amount`. Callers assert sufficiency first; the backend wraps otherwise.
    pub fn debit<B>(
        &mut self,
        backend: &B,
        player: PlayerId,
        table_id: TableId,
        amount: &C,
    ) -> Result<(), EncryptedError>
    where
        B: EncryptedBackend<Cipher = C>,
    {
        let current = self.balance_or_zero(backend, player, table_id);
        let updated = backend.sub(&current, amount)?;
        self.balances.insert((player, table_id), updated);
        Ok(())
    }

    /// Balances held at `table_id`, in no particular order.
    pub fn balances_at(&self, table_id: TableId) -> impl Iterator<Item = (PlayerId, &C)> + '_ {
        self.balances
            .iter()
            .filter(move |((_, table), _)| *table == table_id)
            .map(|((player, _), balance)| (*player, balance))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encrypted::ClearBackend;

    #[test]
    fn credits_accumulate_per_player_and_table() {
        let backend = ClearBackend::new(Some(1));
        let mut ledger = ChipLedger::new();

        ledger.credit(&backend, 1, 0, &backend.encrypt(100)).unwrap();
        ledger.credit(&backend, 1, 0, &backend.encrypt(50)).unwrap();
        ledger.credit(&backend, 1, 1, &backend.encrypt(7)).unwrap();

        assert_eq!(backend.reveal(ledger.balance(1, 0).unwrap()).unwrap(), 150);
        assert_eq!(backend.reveal(ledger.balance(1, 1).unwrap()).unwrap(), 7);
        assert!(ledger.balance(2, 0).is_none());
        assert_eq!(ledger.balances_at(0).count(), 1);
    }

    #[test]
    fn debit_subtracts_from_the_balance() {
        let backend = ClearBackend::new(Some(2));
        let mut ledger = ChipLedger::new();
        ledger.credit(&backend, 4, 2, &backend.encrypt(100)).unwrap();

        ledger.debit(&backend, 4, 2, &backend.encrypt(30)).unwrap();
        assert_eq!(backend.reveal(ledger.balance(4, 2).unwrap()).unwrap(), 70);
    }

    #[test]
    fn staged_copies_do_not_touch_the_original() {
        let backend = ClearBackend::new(Some(3));
        let mut ledger = ChipLedger::new();
        ledger.credit(&backend, 1, 0, &backend.encrypt(10)).unwrap();

        let mut staged = ledger.clone();
        staged.debit(&backend, 1, 0, &backend.encrypt(10)).unwrap();

        assert_eq!(backend.reveal(ledger.balance(1, 0).unwrap()).unwrap(), 10);
        assert_eq!(backend.reveal(staged.balance(1, 0).unwrap()).unwrap(), 0);
    }
}
