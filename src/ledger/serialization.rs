use anyhow::{anyhow, Result};
use ark_ec::CurveGroup;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::ledger::types::StateHash;

/// Encodes a [`StateHash`] into a lowercase hex string without a leading prefix.
pub fn encode_state_hash(hash: StateHash) -> String {
    hex::encode(hash.into_bytes())
}

/// Canonically serializes any arkworks type into a compressed byte vector.
pub fn canonical_serialize_bytes<T>(value: &T) -> Result<Vec<u8>>
where
    T: CanonicalSerialize,
{
    let mut buf = Vec::new();
    value
        .serialize_compressed(&mut buf)
        .map_err(|err| anyhow!("canonical serialize failed: {err}"))?;
    Ok(buf)
}

/// Canonically serializes a curve point and returns it as lowercase hex.
pub fn serialize_curve_hex<C>(value: &C) -> Result<String>
where
    C: CurveGroup + CanonicalSerialize,
{
    canonical_serialize_bytes(value)
        .map(hex::encode)
        .map_err(|err| anyhow!("failed to serialize curve point: {err}"))
}

/// Canonically deserializes a curve point from a hex string (accepts optional 0x prefix).
pub fn deserialize_curve_hex<C>(value: &str) -> Result<C>
where
    C: CurveGroup + CanonicalDeserialize,
{
    let bytes = decode_hex_bytes(value)?;
    deserialize_curve_bytes(&bytes)
}

/// Canonically deserializes a curve point from compressed bytes.
///
/// Deserialization validates that the point is on the curve and in the prime-order subgroup.
pub fn deserialize_curve_bytes<C>(bytes: &[u8]) -> Result<C>
where
    C: CurveGroup + CanonicalDeserialize,
{
    C::deserialize_compressed(&mut &bytes[..])
        .map_err(|err| anyhow!("curve deserialization failed: {err}"))
}

fn decode_hex_bytes(value: &str) -> Result<Vec<u8>> {
    let trimmed = value.trim();
    let without_prefix = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if without_prefix.is_empty() {
        return Err(anyhow!("hex string is empty"));
    }
    hex::decode(without_prefix).map_err(|err| anyhow!("failed to decode hex: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Curve;
    use ark_ec::PrimeGroup;

    #[test]
    fn curve_hex_round_trips_with_and_without_prefix() {
        let point = Curve::generator() * ark_bn254::Fr::from(7u64);
        let hex = serialize_curve_hex(&point).unwrap();

        let plain: Curve = deserialize_curve_hex(&hex).unwrap();
        let prefixed: Curve = deserialize_curve_hex(&format!("0x{hex}")).unwrap();
        assert_eq!(plain, point);
        assert_eq!(prefixed, point);
    }

    #[test]
    fn empty_and_garbage_hex_are_rejected() {
        assert!(deserialize_curve_hex::<Curve>("0x").is_err());
        assert!(deserialize_curve_hex::<Curve>("zz").is_err());
        assert!(deserialize_curve_bytes::<Curve>(&[0xff; 32]).is_err());
    }
}
