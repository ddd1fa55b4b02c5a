//! In-memory vault implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use accord_contract::{CommittedTransaction, StateRef, TokenState};
use accord_types::{LinearId, TxHash};

use crate::{VaultError, VaultReader, VaultWriter};

/// One party's ledger view, held entirely in memory.
///
/// Consumption is a state transition, not a deletion: consumed references
/// stay recorded so a record version can never return to the live set.
pub struct MemoryVault {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    live: BTreeMap<StateRef, TokenState>,
    consumed: BTreeSet<StateRef>,
    committed: BTreeMap<TxHash, CommittedTransaction>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Look up a committed transaction by its notarized identifier.
    pub fn committed(&self, id: &TxHash) -> Option<CommittedTransaction> {
        let inner = self.inner.read().expect("vault lock poisoned");
        inner.committed.get(id).cloned()
    }

    /// Number of transactions recorded in this vault.
    pub fn committed_count(&self) -> usize {
        let inner = self.inner.read().expect("vault lock poisoned");
        inner.committed.len()
    }
}

impl Default for MemoryVault {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultReader for MemoryVault {
    fn live_by_linear_id(
        &self,
        linear_id: &LinearId,
    ) -> Result<Vec<(StateRef, TokenState)>, VaultError> {
        let inner = self.inner.read().expect("vault lock poisoned");
        Ok(inner
            .live
            .iter()
            .filter(|(_, state)| state.linear_id == *linear_id)
            .map(|(reference, state)| (*reference, state.clone()))
            .collect())
    }

    fn live_records(&self) -> Result<Vec<(StateRef, TokenState)>, VaultError> {
        let inner = self.inner.read().expect("vault lock poisoned");
        Ok(inner
            .live
            .iter()
            .map(|(reference, state)| (*reference, state.clone()))
            .collect())
    }

    fn live_by_commodity(&self, code: &str) -> Result<Vec<(StateRef, TokenState)>, VaultError> {
        let inner = self.inner.read().expect("vault lock poisoned");
        Ok(inner
            .live
            .iter()
            .filter(|(_, state)| state.amount.commodity().code == code)
            .map(|(reference, state)| (*reference, state.clone()))
            .collect())
    }
}

impl VaultWriter for MemoryVault {
    fn record_committed(&self, committed: &CommittedTransaction) -> Result<(), VaultError> {
        let mut inner = self.inner.write().expect("vault lock poisoned");
        if inner.committed.contains_key(&committed.id) {
            tracing::debug!(id = %committed.id, "committed transaction already recorded");
            return Ok(());
        }

        for reference in committed.consumed_refs() {
            // A counterparty may consume a record this vault never held
            // (e.g. the incoming side of a transfer); the reference is
            // still marked so it can never be inserted as live later.
            inner.live.remove(&reference);
            inner.consumed.insert(reference);
        }
        for (reference, state) in committed.produced_records() {
            if !inner.consumed.contains(&reference) {
                inner.live.insert(reference, state);
            }
        }
        inner.committed.insert(committed.id, committed.clone());
        Ok(())
    }
}
