use std::fmt;

use ark_bn254::Fr;
use ark_ec::PrimeGroup;
use ark_ff::{UniformRand, Zero};
use ark_serialize::CanonicalSerialize;
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::{Card, Curve, RevealKey};
use crate::ledger::serialization::deserialize_curve_bytes;

const DOMAIN_SEAL: &[u8] = b"veiled-poker/reveal-key-seal/v1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("malformed public key: {0}")]
    Malformed(String),
    #[error("public key is the identity point")]
    Identity,
}

fn point_bytes(point: &Curve) -> Vec<u8> {
    let mut buf = Vec::with_capacity(point.compressed_size());
    point
        .serialize_compressed(&mut buf)
        .expect("serializing into a Vec cannot fail");
    buf
}

/// ElGamal public key a player's hole cards are sealed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPublicKey(#[serde(with = "crate::crypto_serde::curve")] Curve);

impl PlayerPublicKey {
    /// Parses a compressed point. Off-curve, wrong-subgroup and identity points are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let point: Curve =
            deserialize_curve_bytes(bytes).map_err(|err| KeyError::Malformed(err.to_string()))?;
        if point.is_zero() {
            return Err(KeyError::Identity);
        }
        Ok(Self(point))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        point_bytes(&self.0)
    }

    pub fn point(&self) -> Curve {
        self.0
    }
}

pub struct PlayerSecretKey(Fr);

impl PlayerSecretKey {
    pub fn generate<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let mut scalar = Fr::rand(rng);
        while scalar.is_zero() {
            scalar = Fr::rand(rng);
        }
        Self(scalar)
    }

    pub fn public_key(&self) -> PlayerPublicKey {
        PlayerPublicKey(Curve::generator() * self.0)
    }

    /// Recovers the card code by matching `m·G` against the first `deck_size` multiples of G.
    pub fn open_card(&self, sealed: &SealedCard, deck_size: u8) -> Option<Card> {
        let message = sealed.c2 - sealed.c1 * self.0;
        let generator = Curve::generator();
        let mut candidate = Curve::zero();
        for code in 0..deck_size {
            if candidate == message {
                return Some(Card(code));
            }
            candidate += generator;
        }
        None
    }

    pub fn open_reveal_key(&self, sealed: &SealedRevealKey) -> RevealKey {
        let shared = sealed.ephemeral * self.0;
        let stream = keystream(&shared);
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = sealed.ciphertext[i] ^ stream[i];
        }
        RevealKey::new(bytes)
    }
}

impl Drop for PlayerSecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for PlayerSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlayerSecretKey(..)")
    }
}

/// Exponential ElGamal ciphertext `(r·G, m·G + r·PK)` of a small value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedCard {
    #[serde(with = "crate::crypto_serde::curve")]
    pub c1: Curve,
    #[serde(with = "crate::crypto_serde::curve")]
    pub c2: Curve,
}

impl SealedCard {
    pub fn seal<R: Rng + ?Sized>(value: u32, recipient: &PlayerPublicKey, rng: &mut R) -> Self {
        let randomness = Fr::rand(rng);
        let generator = Curve::generator();
        Self {
            c1: generator * randomness,
            c2: generator * Fr::from(u64::from(value)) + recipient.point() * randomness,
        }
    }
}

/// Hashed ElGamal: the reveal key is XORed with SHA-256 of the ECDH point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedRevealKey {
    #[serde(with = "crate::crypto_serde::curve")]
    pub ephemeral: Curve,
    pub ciphertext: [u8; 32],
}

impl SealedRevealKey {
    pub fn seal<R: Rng + ?Sized>(key: &RevealKey, recipient: &PlayerPublicKey, rng: &mut R) -> Self {
        let ephemeral_secret = Fr::rand(rng);
        let shared = recipient.point() * ephemeral_secret;
        let stream = keystream(&shared);
        let mut ciphertext = [0u8; 32];
        for (i, byte) in ciphertext.iter_mut().enumerate() {
            *byte = key.as_bytes()[i] ^ stream[i];
        }
        Self {
            ephemeral: Curve::generator() * ephemeral_secret,
            ciphertext,
        }
    }
}

fn keystream(shared: &Curve) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_SEAL);
    hasher.update(point_bytes(shared));
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::DECK_SIZE;
    use crate::test_utils::serde::assert_round_trip_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn sealed_cards_open_only_for_their_recipient() {
        let mut rng = StdRng::seed_from_u64(5);
        let alice = PlayerSecretKey::generate(&mut rng);
        let bob = PlayerSecretKey::generate(&mut rng);

        let sealed = SealedCard::seal(37, &alice.public_key(), &mut rng);
        assert_eq!(alice.open_card(&sealed, DECK_SIZE), Some(Card(37)));
        assert_eq!(bob.open_card(&sealed, DECK_SIZE), None);
    }

    #[test]
    fn sealing_is_randomized() {
        let mut rng = StdRng::seed_from_u64(6);
        let alice = PlayerSecretKey::generate(&mut rng);
        let first = SealedCard::seal(3, &alice.public_key(), &mut rng);
        let second = SealedCard::seal(3, &alice.public_key(), &mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn reveal_key_seal_round_trips() {
        let mut rng = StdRng::seed_from_u64(7);
        let alice = PlayerSecretKey::generate(&mut rng);
        let bob = PlayerSecretKey::generate(&mut rng);
        let key = RevealKey::random(&mut rng);

        let sealed = SealedRevealKey::seal(&key, &alice.public_key(), &mut rng);
        assert_eq!(alice.open_reveal_key(&sealed), key);
        assert_ne!(bob.open_reveal_key(&sealed), key);
    }

    #[test]
    fn public_key_parsing_rejects_identity_and_garbage() {
        let mut rng = StdRng::seed_from_u64(8);
        let alice = PlayerSecretKey::generate(&mut rng);
        let bytes = alice.public_key().to_bytes();
        assert_eq!(PlayerPublicKey::from_bytes(&bytes), Ok(alice.public_key()));

        let identity = point_bytes(&Curve::zero());
        assert_eq!(PlayerPublicKey::from_bytes(&identity), Err(KeyError::Identity));
        assert!(matches!(
            PlayerPublicKey::from_bytes(&[1, 2, 3]),
            Err(KeyError::Malformed(_))
        ));
    }

    #[test]
    fn sealed_values_round_trip_with_serde() {
        let mut rng = StdRng::seed_from_u64(9);
        let alice = PlayerSecretKey::generate(&mut rng);
        assert_round_trip_eq(&alice.public_key());
        assert_round_trip_eq(&SealedCard::seal(12, &alice.public_key(), &mut rng));
        let key = RevealKey::random(&mut rng);
        assert_round_trip_eq(&SealedRevealKey::seal(&key, &alice.public_key(), &mut rng));
    }
}
