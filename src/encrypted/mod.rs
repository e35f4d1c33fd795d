//! The encrypted-integer capability the table state machine runs on.
//!
//! Stakes and hole cards live behind [`EncryptedBackend::Cipher`] handles. The state machine only
//! ever combines them with homomorphic arithmetic and comparisons, and gates every decision on an
//! encrypted boolean through [`EncryptedBackend::require`]. The only plaintext that leaves the
//! backend is a resolved boolean from [`EncryptedBackend::decrypt_bool`].

pub mod clear;

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::cards::{CardCommitment, CommitmentContext, PlayerPublicKey, RevealKey, SealedCard};

pub use clear::{ClearBackend, EncryptedFlag, Handle};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncryptedError {
    #[error("encrypted assertion failed")]
    AssertionFailed,
    #[error("unknown ciphertext handle {0}")]
    UnknownHandle(u64),
}

pub trait EncryptedBackend {
    type Cipher: Clone + Debug + PartialEq + Serialize + DeserializeOwned;
    type Bool: Clone + Debug;

    /// Publicly known constant lifted into the encrypted domain.
    fn trivial(&self, value: u32) -> Self::Cipher;

    fn add(&self, lhs: &Self::Cipher, rhs: &Self::Cipher) -> Result<Self::Cipher, EncryptedError>;
    fn sub(&self, lhs: &Self::Cipher, rhs: &Self::Cipher) -> Result<Self::Cipher, EncryptedError>;
    fn max(&self, lhs: &Self::Cipher, rhs: &Self::Cipher) -> Result<Self::Cipher, EncryptedError>;

    fn gte(&self, lhs: &Self::Cipher, rhs: &Self::Cipher) -> Result<Self::Bool, EncryptedError>;
    fn gt(&self, lhs: &Self::Cipher, rhs: &Self::Cipher) -> Result<Self::Bool, EncryptedError>;
    fn and(&self, lhs: &Self::Bool, rhs: &Self::Bool) -> Self::Bool;
    fn eq_all(&self, values: &[Self::Cipher]) -> Result<Self::Bool, EncryptedError>;

    /// Aborts the current operation with [`EncryptedError::AssertionFailed`] unless `flag` holds.
    fn require(&self, flag: &Self::Bool) -> Result<(), EncryptedError>;

    /// Resolves a boolean to plaintext. Reserved for street closing and withdrawal checks.
    fn decrypt_bool(&self, flag: &Self::Bool) -> bool;

    /// Uniform encrypted value in `0..bound`.
    fn random_below(&self, bound: u8) -> Self::Cipher;

    /// Re-encrypts a value so only the holder of `recipient`'s secret key can read it.
    fn seal(
        &self,
        value: &Self::Cipher,
        recipient: &PlayerPublicKey,
    ) -> Result<SealedCard, EncryptedError>;

    /// One-way commitment to the plaintext behind `value`, computed inside the backend.
    fn commit(
        &self,
        value: &Self::Cipher,
        reveal_key: &RevealKey,
        context: &CommitmentContext,
    ) -> Result<CardCommitment, EncryptedError>;
}

/// Encrypted sum of `values`; the empty sum is zero.
pub fn sum<B: EncryptedBackend>(
    backend: &B,
    values: &[B::Cipher],
) -> Result<B::Cipher, EncryptedError> {
    values
        .iter()
        .try_fold(backend.trivial(0), |acc, value| backend.add(&acc, value))
}

/// Encrypted `values[i] <= bound` for every `i`.
pub fn all_at_most<B: EncryptedBackend>(
    backend: &B,
    values: &[B::Cipher],
    bound: &B::Cipher,
) -> Result<B::Bool, EncryptedError> {
    let mut acc: Option<B::Bool> = None;
    for value in values {
        let flag = backend.gte(bound, value)?;
        acc = Some(match acc {
            Some(prev) => backend.and(&prev, &flag),
            None => flag,
        });
    }
    match acc {
        Some(flag) => Ok(flag),
        None => backend.gte(bound, bound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_folds_from_zero() {
        let backend = ClearBackend::new(Some(1));
        let values = vec![backend.encrypt(5), backend.encrypt(10), backend.encrypt(20)];
        let total = sum(&backend, &values).unwrap();
        assert_eq!(backend.reveal(&total).unwrap(), 35);

        let empty = sum(&backend, &[]).unwrap();
        assert_eq!(backend.reveal(&empty).unwrap(), 0);
    }

    #[test]
    fn all_at_most_checks_every_value() {
        let backend = ClearBackend::new(Some(2));
        let zero = backend.trivial(0);
        let zeros = vec![backend.encrypt(0), backend.encrypt(0)];
        let mixed = vec![backend.encrypt(0), backend.encrypt(3)];

        assert!(backend.decrypt_bool(&all_at_most(&backend, &zeros, &zero).unwrap()));
        assert!(!backend.decrypt_bool(&all_at_most(&backend, &mixed, &zero).unwrap()));
        assert!(backend.decrypt_bool(&all_at_most(&backend, &[], &zero).unwrap()));
    }
}
