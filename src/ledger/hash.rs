use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ledger::types::StateHash;

const DOMAIN_MESSAGE: &[u8] = b"veiled-poker/journal/message/v1";
const DOMAIN_CHAIN: &[u8] = b"veiled-poker/journal/chain/v1";

fn finalize_hash(hasher: Sha256) -> StateHash {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    StateHash::from(bytes)
}

fn write_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

/// Hashes the canonical JSON form of a journaled message.
pub fn hash_message<M: Serialize>(message: &M) -> Result<StateHash, serde_json::Error> {
    let encoded = serde_json::to_vec(message)?;
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_MESSAGE);
    write_bytes(&mut hasher, &encoded);
    Ok(finalize_hash(hasher))
}

pub fn chain_state_hash(previous: StateHash, message_hash: StateHash) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_CHAIN);
    hasher.update(previous.as_bytes());
    hasher.update(message_hash.as_bytes());
    finalize_hash(hasher)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry<M> {
    pub message: M,
    pub previous_hash: StateHash,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JournalError {
    #[error("journal message could not be encoded: {0}")]
    Encoding(String),
    #[error("journal chain broken at entry {index}")]
    Broken { index: usize },
}

/// Append-only hash chain over committed notifications.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Journal<M> {
    entries: Vec<JournalEntry<M>>,
    head: StateHash,
}

impl<M> Default for Journal<M> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            head: StateHash::zero(),
        }
    }
}

impl<M: Serialize> Journal<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head(&self) -> StateHash {
        self.head
    }

    pub fn entries(&self) -> &[JournalEntry<M>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, message: M) -> Result<StateHash, JournalError> {
        self.append_all(vec![message])
    }

    /// Appends a batch. Every message is encoded before the first one is linked, so an encoding
    /// failure leaves the journal untouched.
    pub fn append_all(&mut self, messages: Vec<M>) -> Result<StateHash, JournalError> {
        let hashes = messages
            .iter()
            .map(|message| {
                hash_message(message).map_err(|err| JournalError::Encoding(err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        for (message, message_hash) in messages.into_iter().zip(hashes) {
            let previous_hash = self.head;
            let state_hash = chain_state_hash(previous_hash, message_hash);
            self.entries.push(JournalEntry {
                message,
                previous_hash,
                state_hash,
            });
            self.head = state_hash;
        }
        Ok(self.head)
    }

    /// Recomputes every link from the zero hash.
    pub fn verify(&self) -> Result<(), JournalError> {
        let mut previous = StateHash::zero();
        for (index, entry) in self.entries.iter().enumerate() {
            let message_hash = hash_message(&entry.message)
                .map_err(|err| JournalError::Encoding(err.to_string()))?;
            if entry.previous_hash != previous
                || entry.state_hash != chain_state_hash(previous, message_hash)
            {
                return Err(JournalError::Broken { index });
            }
            previous = entry.state_hash;
        }
        if previous != self.head {
            return Err(JournalError::Broken {
                index: self.entries.len(),
            });
        }
        Ok(())
    }
}
