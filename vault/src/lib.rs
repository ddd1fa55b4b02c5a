//! Ledger-query collaborator traits and the in-memory reference vault.
//!
//! The flow layer depends only on the traits; any backend that can answer
//! "which record versions are live?" and apply a committed transaction can
//! stand behind them. Persistence format is out of scope — [`MemoryVault`]
//! is the reference implementation used by nodes and tests.

pub mod memory;

pub use memory::MemoryVault;

use accord_contract::{CommittedTransaction, StateRef, TokenState};
use accord_types::LinearId;
use thiserror::Error;

/// Vault access failure.
///
/// The in-memory vault is infallible; the variant exists so backends with
/// real I/O can surface their failures through the same trait.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Read access to the set of live (unconsumed) record versions.
pub trait VaultReader: Send + Sync {
    /// Every live version of the given linear id. The ledger invariant says
    /// there is at most one; callers treat zero or several as an error.
    fn live_by_linear_id(
        &self,
        linear_id: &LinearId,
    ) -> Result<Vec<(StateRef, TokenState)>, VaultError>;

    /// All live records.
    fn live_records(&self) -> Result<Vec<(StateRef, TokenState)>, VaultError>;

    /// Live records denominated in the given commodity code.
    fn live_by_commodity(&self, code: &str) -> Result<Vec<(StateRef, TokenState)>, VaultError>;
}

/// Write access: apply a notarized transaction to the local ledger view.
pub trait VaultWriter: VaultReader {
    /// Mark the transaction's inputs consumed and its outputs live.
    ///
    /// Applying the same committed transaction twice is a no-op, so the
    /// initiator recording locally and later receiving its own distribution
    /// converge on the same state.
    fn record_committed(&self, committed: &CommittedTransaction) -> Result<(), VaultError>;
}
