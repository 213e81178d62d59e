//! Checkpoint serialization utilities.
//!
//! Field elements travel through checkpoints as decimal strings, the same
//! representation the external tooling uses. A single generic snapshot and
//! structural-equality utility is driven by the canonical serialized form, so
//! a newly added field cannot silently escape copy/equality coverage.

use ark_bn254::Fr;
use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// A decimal string did not parse as a field element.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid field element string: {text}")]
pub struct ParseFieldError
{
    pub text: String
}

/// Render a field element as its canonical decimal representative.
pub fn fr_to_dec(element: &Fr) -> String
{
    let n: BigUint = (*element).into();
    n.to_str_radix(10)
}

/// Parse a decimal string into a field element.
pub fn fr_from_dec(text: &str) -> Result<Fr, ParseFieldError>
{
    let n = text
        .parse::<BigUint>()
        .map_err(|_| ParseFieldError { text: text.into() })?;
    Ok(Fr::from(n))
}

/// Serde adapter for a bare `Fr` field.
pub mod fr_str
{
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(element: &Fr, serializer: S) -> Result<S::Ok, S::Error>
    {
        serializer.serialize_str(&fr_to_dec(element))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fr, D::Error>
    {
        let text = String::deserialize(deserializer)?;
        fr_from_dec(&text).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for an `Option<Fr>` field.
pub mod fr_opt
{
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(element: &Option<Fr>, serializer: S) -> Result<S::Ok, S::Error>
    {
        match element
        {
            Some(e) => serializer.serialize_some(&fr_to_dec(e)),
            None => serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Fr>, D::Error>
    {
        let text = Option::<String>::deserialize(deserializer)?;
        match text
        {
            Some(t) => Ok(Some(fr_from_dec(&t).map_err(serde::de::Error::custom)?)),
            None => Ok(None)
        }
    }
}

/// Serde adapter for a `Vec<Fr>` field.
pub mod fr_vec
{
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(elements: &[Fr], serializer: S) -> Result<S::Ok, S::Error>
    {
        let texts: Vec<String> = elements.iter().map(fr_to_dec).collect();
        texts.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Fr>, D::Error>
    {
        let texts = Vec::<String>::deserialize(deserializer)?;
        texts
            .iter()
            .map(|t| fr_from_dec(t).map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Serde adapter for a `u128` counter, which exceeds what a JSON number can
/// carry losslessly.
pub mod u128_str
{
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error>
    {
        let text = String::deserialize(deserializer)?;
        text.parse::<u128>().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for a `Vec<u128>` field.
pub mod u128_vec
{
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[u128], serializer: S) -> Result<S::Ok, S::Error>
    {
        let texts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        texts.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u128>, D::Error>
    {
        let texts = Vec::<String>::deserialize(deserializer)?;
        texts
            .iter()
            .map(|t| t.parse::<u128>().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Lossless checkpointing plus structural clone/equality over the canonical
/// serialized form.
///
/// Types opting in declare what their canonical form contains (coordinator
/// private keys and signup counts are excluded by their serde attributes);
/// comparison and snapshotting then follow from that single definition.
pub trait Checkpoint: Serialize + DeserializeOwned + Sized
{
    /// Serialize to the canonical checkpoint document.
    fn serialize_state(&self) -> Result<serde_json::Value, serde_json::Error>
    {
        serde_json::to_value(self)
    }

    /// Restore from a checkpoint document. Secrets excluded from the
    /// canonical form must be re-supplied afterwards.
    fn deserialize_state(value: serde_json::Value) -> Result<Self, serde_json::Error>
    {
        serde_json::from_value(value)
    }

    /// Structural equality driven by the canonical serialized form.
    fn structural_eq(&self, other: &Self) -> bool
    {
        match (self.serialize_state(), other.serialize_state())
        {
            (Ok(a), Ok(b)) => a == b,
            _ => false
        }
    }
}
