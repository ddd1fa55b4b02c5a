//! Party identity types.
//!
//! A party is a named participant on the network. The display name is the
//! handle humans pass around; the public key is what actually signs. Name
//! resolution (display name → `Party`) is an external collaborator concern —
//! nothing in the core guesses at identities.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::keys::PublicKey;

/// A party's well-known display name, e.g. "PartyA".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartyName(String);

impl PartyName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved network participant: display name plus signing identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    pub name: PartyName,
    pub key: PublicKey,
}

impl Party {
    pub fn new(name: PartyName, key: PublicKey) -> Self {
        Self { name, key }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
