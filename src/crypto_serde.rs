use ark_ec::CurveGroup;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serializer};

use crate::ledger::serialization::{deserialize_curve_hex, serialize_curve_hex};

/// Serde helpers for encoding curve points as lowercase hex strings.
pub mod curve {
    use super::*;

    pub fn serialize<C, S>(value: &C, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        C: CurveGroup + CanonicalSerialize,
        S: Serializer,
    {
        let hex = serialize_curve_hex(value).map_err(SerError::custom)?;
        serializer.serialize_str(&hex)
    }

    pub fn deserialize<'de, C, D>(deserializer: D) -> std::result::Result<C, D::Error>
    where
        C: CurveGroup + CanonicalDeserialize,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        deserialize_curve_hex(&s).map_err(DeError::custom)
    }
}
