use std::collections::HashMap;

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{EncryptedBackend, EncryptedError};
use crate::cards::{CardCommitment, CommitmentContext, PlayerPublicKey, RevealKey, SealedCard};

const LOG_TARGET: &str = "encrypted::clear";

/// Opaque reference to a value held by a [`ClearBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(u64);

impl Handle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Boolean produced by a comparison. Callers can only branch on it through the backend.
#[derive(Clone, Copy, Debug)]
pub struct EncryptedFlag(bool);

#[derive(Debug, Default)]
struct Arena {
    next: u64,
    values: HashMap<u64, u32>,
    /// Interned handles of public constants.
    constants: HashMap<u32, Handle>,
}

impl Arena {
    fn insert(&mut self, value: u32) -> Handle {
        let id = self.next;
        self.next += 1;
        self.values.insert(id, value);
        Handle(id)
    }

    fn get(&self, handle: &Handle) -> Result<u32, EncryptedError> {
        self.values
            .get(&handle.0)
            .copied()
            .ok_or(EncryptedError::UnknownHandle(handle.0))
    }

    fn constant(&mut self, value: u32) -> Handle {
        if let Some(handle) = self.constants.get(&value) {
            return *handle;
        }
        let handle = self.insert(value);
        self.constants.insert(value, handle);
        handle
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

/// In-process backend that keeps plaintexts in a private arena and hands out handles.
///
/// It honours the same contract as a real FHE coprocessor: arithmetic wraps at `u32`, and the
/// state machine never sees a magnitude. [`ClearBackend::reveal`] stands in for the key-holder's
/// off-line decryption and is not part of [`EncryptedBackend`].
///
/// Meant for tests and demos: handles are never freed, so the arena grows with every ciphertext
/// an operation produces, including those of rejected operations. Only public constants from
/// [`EncryptedBackend::trivial`] are interned.
#[derive(Debug)]
pub struct ClearBackend {
    arena: Mutex<Arena>,
    rng: Mutex<StdRng>,
}

impl ClearBackend {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            arena: Mutex::new(Arena::default()),
            rng: Mutex::new(rng),
        }
    }

    /// Client-side encryption of an input such as a buy-in or raise amount.
    pub fn encrypt(&self, value: u32) -> Handle {
        self.arena.lock().insert(value)
    }

    pub fn reveal(&self, handle: &Handle) -> Result<u32, EncryptedError> {
        self.arena.lock().get(handle)
    }

    /// Number of values held by the arena.
    pub fn arena_len(&self) -> usize {
        self.arena.lock().len()
    }

    fn binary(
        &self,
        lhs: &Handle,
        rhs: &Handle,
        op: impl FnOnce(u32, u32) -> u32,
    ) -> Result<Handle, EncryptedError> {
        let mut arena = self.arena.lock();
        let value = op(arena.get(lhs)?, arena.get(rhs)?);
        Ok(arena.insert(value))
    }

    fn compare(
        &self,
        lhs: &Handle,
        rhs: &Handle,
        op: impl FnOnce(u32, u32) -> bool,
    ) -> Result<EncryptedFlag, EncryptedError> {
        let arena = self.arena.lock();
        Ok(EncryptedFlag(op(arena.get(lhs)?, arena.get(rhs)?)))
    }
}

impl EncryptedBackend for ClearBackend {
    type Cipher = Handle;
    type Bool = EncryptedFlag;

    fn trivial(&self, value: u32) -> Handle {
        self.arena.lock().constant(value)
    }

    fn add(&self, lhs: &Handle, rhs: &Handle) -> Result<Handle, EncryptedError> {
        self.binary(lhs, rhs, u32::wrapping_add)
    }

    fn sub(&self, lhs: &Handle, rhs: &Handle) -> Result<Handle, EncryptedError> {
        self.binary(lhs, rhs, u32::wrapping_sub)
    }

    fn max(&self, lhs: &Handle, rhs: &Handle) -> Result<Handle, EncryptedError> {
        self.binary(lhs, rhs, u32::max)
    }

    fn gte(&self, lhs: &Handle, rhs: &Handle) -> Result<EncryptedFlag, EncryptedError> {
        self.compare(lhs, rhs, |a, b| a >= b)
    }

    fn gt(&self, lhs: &Handle, rhs: &Handle) -> Result<EncryptedFlag, EncryptedError> {
        self.compare(lhs, rhs, |a, b| a > b)
    }

    fn and(&self, lhs: &EncryptedFlag, rhs: &EncryptedFlag) -> EncryptedFlag {
        EncryptedFlag(lhs.0 && rhs.0)
    }

    fn eq_all(&self, values: &[Handle]) -> Result<EncryptedFlag, EncryptedError> {
        let arena = self.arena.lock();
        let mut plain = values.iter().map(|handle| arena.get(handle));
        let first = match plain.next() {
            Some(value) => value?,
            None => return Ok(EncryptedFlag(true)),
        };
        for value in plain {
            if value? != first {
                return Ok(EncryptedFlag(false));
            }
        }
        Ok(EncryptedFlag(true))
    }

    fn require(&self, flag: &EncryptedFlag) -> Result<(), EncryptedError> {
        if flag.0 {
            Ok(())
        } else {
            tracing::debug!(target: LOG_TARGET, "encrypted assertion rejected");
            Err(EncryptedError::AssertionFailed)
        }
    }

    fn decrypt_bool(&self, flag: &EncryptedFlag) -> bool {
        flag.0
    }

    fn random_below(&self, bound: u8) -> Handle {
        let value = if bound == 0 {
            0
        } else {
            self.rng.lock().gen_range(0..bound)
        };
        self.arena.lock().insert(u32::from(value))
    }

    fn seal(&self, value: &Handle, recipient: &PlayerPublicKey) -> Result<SealedCard, EncryptedError> {
        let plain = self.arena.lock().get(value)?;
        let mut rng = self.rng.lock();
        Ok(SealedCard::seal(plain, recipient, &mut *rng))
    }

    fn commit(
        &self,
        value: &Handle,
        reveal_key: &RevealKey,
        context: &CommitmentContext,
    ) -> Result<CardCommitment, EncryptedError> {
        let plain = self.arena.lock().get(value)?;
        Ok(CardCommitment::compute(context, reveal_key, plain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, PlayerSecretKey, DECK_SIZE};

    #[test]
    fn arithmetic_wraps_like_u32() {
        let backend = ClearBackend::new(Some(1));
        let small = backend.encrypt(3);
        let big = backend.encrypt(10);

        let diff = backend.sub(&small, &big).unwrap();
        assert_eq!(backend.reveal(&diff).unwrap(), 3u32.wrapping_sub(10));

        let max = backend.max(&small, &big).unwrap();
        assert_eq!(backend.reveal(&max).unwrap(), 10);
    }

    #[test]
    fn public_constants_share_one_handle() {
        let backend = ClearBackend::new(Some(6));
        let zero = backend.trivial(0);
        let held = backend.arena_len();

        for _ in 0..10 {
            assert_eq!(backend.trivial(0), zero);
        }
        assert_eq!(backend.arena_len(), held);
        assert_ne!(backend.trivial(10), zero);
        assert_eq!(backend.arena_len(), held + 1);

        let sum = backend.add(&zero, &backend.trivial(10)).unwrap();
        assert_eq!(backend.reveal(&sum).unwrap(), 10);
        assert_eq!(backend.reveal(&zero).unwrap(), 0);
    }

    #[test]
    fn rejected_assertions_log_under_the_backend_target() {
        use std::sync::Arc;

        use tracing::{Event, Subscriber};
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        struct Targets(Arc<Mutex<Vec<String>>>);

        impl<S: Subscriber> Layer<S> for Targets {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                self.0.lock().push(event.metadata().target().to_string());
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(Targets(Arc::clone(&seen)));
        let backend = ClearBackend::new(Some(7));
        let (one, two) = (backend.encrypt(1), backend.encrypt(2));
        tracing::subscriber::with_default(subscriber, || {
            let flag = backend.gt(&one, &two).unwrap();
            assert!(backend.require(&flag).is_err());
        });

        assert_eq!(*seen.lock(), vec![LOG_TARGET.to_string()]);
    }

    #[test]
    fn comparisons_only_surface_through_require() {
        let backend = ClearBackend::new(Some(2));
        let a = backend.encrypt(20);
        let b = backend.encrypt(20);
        let c = backend.encrypt(19);

        assert!(backend.require(&backend.gte(&a, &b).unwrap()).is_ok());
        assert_eq!(
            backend.require(&backend.gt(&a, &b).unwrap()),
            Err(EncryptedError::AssertionFailed)
        );
        assert!(backend.decrypt_bool(&backend.eq_all(&[a, b]).unwrap()));
        assert!(!backend.decrypt_bool(&backend.eq_all(&[a, b, c]).unwrap()));
    }

    #[test]
    fn unknown_handles_are_reported() {
        let backend = ClearBackend::new(Some(3));
        let known = backend.encrypt(1);
        let forged = Handle(999);
        assert_eq!(
            backend.add(&known, &forged),
            Err(EncryptedError::UnknownHandle(999))
        );
    }

    #[test]
    fn random_values_stay_below_bound() {
        let backend = ClearBackend::new(Some(4));
        for _ in 0..200 {
            let card = backend.random_below(DECK_SIZE);
            assert!(backend.reveal(&card).unwrap() < u32::from(DECK_SIZE));
        }
        assert_eq!(backend.reveal(&backend.random_below(0)).unwrap(), 0);
    }

    #[test]
    fn sealed_values_open_for_the_recipient() {
        let backend = ClearBackend::new(Some(5));
        let mut rng = StdRng::seed_from_u64(50);
        let secret = PlayerSecretKey::generate(&mut rng);

        let card = backend.encrypt(44);
        let sealed = backend.seal(&card, &secret.public_key()).unwrap();
        assert_eq!(secret.open_card(&sealed, DECK_SIZE), Some(Card(44)));
    }

    #[test]
    fn seeded_backends_draw_the_same_cards() {
        let first = ClearBackend::new(Some(9));
        let second = ClearBackend::new(Some(9));
        let draws = |backend: &ClearBackend| {
            (0..10)
                .map(|_| backend.reveal(&backend.random_below(DECK_SIZE)).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(&first), draws(&second));
    }
}
