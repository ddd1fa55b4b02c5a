//! The notarization/commit collaborator.

use accord_contract::{CommittedTransaction, SignedTransaction, StateRef};
use accord_types::TxHash;
use async_trait::async_trait;
use thiserror::Error;

/// Notary submission failure.
#[derive(Debug, Error)]
pub enum NotaryError {
    /// An input was already consumed by an earlier committed transaction.
    #[error("input {reference} already consumed by transaction {conflicting_tx}")]
    Conflict {
        reference: StateRef,
        conflicting_tx: TxHash,
    },

    /// The submission failed notary-side validation (bad signatures,
    /// malformed payload).
    #[error("{0}")]
    Rejected(String),
}

/// Hands a fully-signed transaction to the external notarization service,
/// which performs the global double-spend/ordering check on the consumed
/// inputs and either commits or rejects. Atomic from this side: there is no
/// partial commit.
#[async_trait]
pub trait NotaryClient: Send + Sync {
    async fn submit(&self, tx: &SignedTransaction) -> Result<CommittedTransaction, NotaryError>;
}
