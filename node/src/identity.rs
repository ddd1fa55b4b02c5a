//! The identity-resolution collaborator.
//!
//! Maps well-known display names to resolved parties. Zero matches and
//! ambiguous matches are distinct errors — a name is never guessed.

use std::collections::BTreeMap;
use std::sync::RwLock;

use accord_types::{Party, PartyName};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unknown party: {0}")]
    Unknown(String),

    #[error("ambiguous party name {name}: {candidates} case-insensitive matches")]
    Ambiguous { name: String, candidates: usize },
}

/// Registry of every party on the network, shared by all local nodes.
#[derive(Default)]
pub struct IdentityDirectory {
    parties: RwLock<BTreeMap<PartyName, Party>>,
}

impl IdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a party under its display name. Returns `false` when the
    /// name is already taken (by a different key).
    pub fn register(&self, party: Party) -> bool {
        let mut parties = self.parties.write().expect("directory lock poisoned");
        match parties.get(&party.name) {
            Some(existing) => *existing == party,
            None => {
                parties.insert(party.name.clone(), party);
                true
            }
        }
    }

    /// Resolve a display name to a party.
    ///
    /// Exact matches win; otherwise a case-insensitive lookup is attempted,
    /// which fails with [`IdentityError::Ambiguous`] when several registered
    /// names differ only in case.
    pub fn resolve_party(&self, name: &str) -> Result<Party, IdentityError> {
        let parties = self.parties.read().expect("directory lock poisoned");
        if let Some(party) = parties.get(&PartyName::new(name)) {
            return Ok(party.clone());
        }

        let lowered = name.to_lowercase();
        let candidates: Vec<&Party> = parties
            .values()
            .filter(|p| p.name.as_str().to_lowercase() == lowered)
            .collect();
        match candidates.as_slice() {
            [] => Err(IdentityError::Unknown(name.to_string())),
            [party] => Ok((*party).clone()),
            _ => Err(IdentityError::Ambiguous {
                name: name.to_string(),
                candidates: candidates.len(),
            }),
        }
    }

    /// Every registered party, in name order.
    pub fn parties(&self) -> Vec<Party> {
        let parties = self.parties.read().expect("directory lock poisoned");
        parties.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_types::PublicKey;

    fn party(name: &str, key_byte: u8) -> Party {
        Party::new(PartyName::new(name), PublicKey([key_byte; 32]))
    }

    #[test]
    fn register_and_resolve_exact() {
        let directory = IdentityDirectory::new();
        assert!(directory.register(party("PartyA", 1)));
        let resolved = directory.resolve_party("PartyA").unwrap();
        assert_eq!(resolved.key, PublicKey([1u8; 32]));
    }

    #[test]
    fn duplicate_name_different_key_is_refused() {
        let directory = IdentityDirectory::new();
        assert!(directory.register(party("PartyA", 1)));
        assert!(!directory.register(party("PartyA", 2)));
    }

    #[test]
    fn re_registering_the_same_party_is_fine() {
        let directory = IdentityDirectory::new();
        assert!(directory.register(party("PartyA", 1)));
        assert!(directory.register(party("PartyA", 1)));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let directory = IdentityDirectory::new();
        assert!(matches!(
            directory.resolve_party("Nobody"),
            Err(IdentityError::Unknown(_))
        ));
    }

    #[test]
    fn case_insensitive_fallback_resolves_single_match() {
        let directory = IdentityDirectory::new();
        directory.register(party("PartyA", 1));
        let resolved = directory.resolve_party("partya").unwrap();
        assert_eq!(resolved.name.as_str(), "PartyA");
    }

    #[test]
    fn case_variants_are_ambiguous() {
        let directory = IdentityDirectory::new();
        directory.register(party("PartyA", 1));
        directory.register(party("PARTYA", 2));
        assert!(matches!(
            directory.resolve_party("partya"),
            Err(IdentityError::Ambiguous { candidates: 2, .. })
        ));
    }

    #[test]
    fn parties_listed_in_name_order() {
        let directory = IdentityDirectory::new();
        directory.register(party("PartyB", 2));
        directory.register(party("PartyA", 1));
        let names: Vec<String> = directory
            .parties()
            .iter()
            .map(|p| p.name.as_str().to_string())
            .collect();
        assert_eq!(names, vec!["PartyA", "PartyB"]);
    }
}
