//! Stable cross-version token identifier.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::hash::hex;

/// A stable identifier shared by every historical version of the same token.
///
/// Assigned once at issuance from the OS random source and never changed by
/// any later transaction. 16 bytes, displayed and parsed as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinearId([u8; 16]);

/// Failure to parse a linear identifier from its hex form.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid linear id: expected 32 hex characters")]
pub struct LinearIdParseError;

impl LinearId {
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh identifier from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for LinearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinearId({})", hex::encode(&self.0))
    }
}

impl fmt::Display for LinearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl FromStr for LinearId {
    type Err = LinearIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).ok_or(LinearIdParseError)?;
        let arr: [u8; 16] = bytes.try_into().map_err(|_| LinearIdParseError)?;
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_unique() {
        let a = LinearId::generate();
        let b = LinearId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn display_parse_roundtrip() {
        let id = LinearId::new([0xAB; 16]);
        let parsed: LinearId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!("abcd".parse::<LinearId>(), Err(LinearIdParseError));
    }

    #[test]
    fn parse_rejects_non_hex() {
        let s = "zz".repeat(16);
        assert_eq!(s.parse::<LinearId>(), Err(LinearIdParseError));
    }
}
