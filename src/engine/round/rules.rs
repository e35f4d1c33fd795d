use super::errors::ActionError;
use super::types::Round;
use crate::encrypted::{all_at_most, EncryptedBackend, EncryptedError};

/// Legality checks evaluated entirely on ciphertexts.
///
/// Each check builds an encrypted predicate and hands it to [`EncryptedBackend::require`]; a
/// false predicate rejects the action as [`ActionError::IllegalAction`].
pub trait ConfidentialRules<C> {
    /// The caller's street contribution already covers the highest bet.
    fn require_call<B>(&self, backend: &B, seat: usize) -> Result<(), ActionError>
    where
        B: EncryptedBackend<Cipher = C>;

    /// Nobody has put chips in on this street.
    fn require_check<B>(&self, backend: &B) -> Result<(), ActionError>
    where
        B: EncryptedBackend<Cipher = C>;

    /// The raise tops the highest bet and is covered by the caller's balance.
    fn require_raise<B>(&self, backend: &B, amount: &C, balance: &C) -> Result<(), ActionError>
    where
        B: EncryptedBackend<Cipher = C>;

    /// True once every contribution on the street is equal. Resolves one boolean to plaintext.
    fn contributions_settled<B>(&self, backend: &B) -> Result<bool, ActionError>
    where
        B: EncryptedBackend<Cipher = C>;
}

fn reject_on_assertion(err: EncryptedError) -> ActionError {
    match err {
        EncryptedError::AssertionFailed => ActionError::IllegalAction,
        other => ActionError::Encrypted(other),
    }
}

impl<C: Clone> ConfidentialRules<C> for Round<C> {
    fn require_call<B>(&self, backend: &B, seat: usize) -> Result<(), ActionError>
    where
        B: EncryptedBackend<Cipher = C>,
    {
        let contribution = self.chips.get(seat).ok_or(ActionError::NotPlayersTurn)?;
        let covered = backend.gte(contribution, &self.highest_chip)?;
        backend.require(&covered).map_err(reject_on_assertion)
    }

    fn require_check<B>(&self, backend: &B) -> Result<(), ActionError>
    where
        B: EncryptedBackend<Cipher = C>,
    {
        let zero = backend.trivial(0);
        let unopened = all_at_most(backend, &self.chips, &zero)?;
        backend.require(&unopened).map_err(reject_on_assertion)
    }

    fn require_raise<B>(&self, backend: &B, amount: &C, balance: &C) -> Result<(), ActionError>
    where
        B: EncryptedBackend<Cipher = C>,
    {
        let tops = backend.gt(amount, &self.highest_chip)?;
        let funded = backend.gte(balance, amount)?;
        backend
            .require(&backend.and(&tops, &funded))
            .map_err(reject_on_assertion)
    }

    fn contributions_settled<B>(&self, backend: &B) -> Result<bool, ActionError>
    where
        B: EncryptedBackend<Cipher = C>,
    {
        let equal = backend.eq_all(&self.chips)?;
        Ok(backend.decrypt_bool(&equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encrypted::ClearBackend;

    fn round_with(backend: &ClearBackend, chips: &[u32], highest: u32) -> Round<crate::encrypted::Handle> {
        let players = (0..chips.len() as u64).collect();
        let mut round = Round::open(backend, players, backend.encrypt(highest));
        round.chips = chips.iter().map(|c| backend.encrypt(*c)).collect();
        round
    }

    #[test]
    fn call_requires_covering_the_highest_bet() {
        let backend = ClearBackend::new(Some(1));
        let round = round_with(&backend, &[20, 5, 10], 20);
        assert_eq!(round.require_call(&backend, 0), Ok(()));
        assert_eq!(round.require_call(&backend, 1), Err(ActionError::IllegalAction));
    }

    #[test]
    fn check_requires_an_unopened_street() {
        let backend = ClearBackend::new(Some(2));
        assert_eq!(round_with(&backend, &[0, 0], 0).require_check(&backend), Ok(()));
        assert_eq!(
            round_with(&backend, &[0, 5], 5).require_check(&backend),
            Err(ActionError::IllegalAction)
        );
    }

    #[test]
    fn raise_must_top_highest_and_be_funded() {
        let backend = ClearBackend::new(Some(3));
        let round = round_with(&backend, &[0, 5, 10], 10);
        let balance = backend.encrypt(50);

        assert_eq!(round.require_raise(&backend, &backend.encrypt(20), &balance), Ok(()));
        assert_eq!(
            round.require_raise(&backend, &backend.encrypt(10), &balance),
            Err(ActionError::IllegalAction)
        );
        assert_eq!(
            round.require_raise(&backend, &backend.encrypt(60), &balance),
            Err(ActionError::IllegalAction)
        );
    }

    #[test]
    fn settled_when_all_contributions_match() {
        let backend = ClearBackend::new(Some(4));
        assert_eq!(round_with(&backend, &[7, 7, 7], 7).contributions_settled(&backend), Ok(true));
        assert_eq!(round_with(&backend, &[7, 0, 7], 7).contributions_settled(&backend), Ok(false));
    }
}
