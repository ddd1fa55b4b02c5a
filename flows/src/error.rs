//! Flow error taxonomy.
//!
//! Validation and ownership errors are detected locally, before any session
//! is opened, and are never retried — they are caller mistakes. `Timeout`
//! and `NotarizationConflict` are the only transient conditions; both carry
//! the flow's intent and linear id so the caller can build a fresh proposal.

use std::time::Duration;

use accord_contract::{ContractError, Intent, StateRef};
use accord_types::{LinearId, PartyName, TxHash};
use accord_vault::VaultError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    /// An issued amount must be strictly positive.
    #[error("an issued token amount must be strictly positive")]
    InvalidAmount,

    /// The proposal failed the contract validator.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// No unique live record exists for the requested linear id.
    #[error("no unique live record for linear id {linear_id} ({found} found)")]
    RecordNotFound { linear_id: LinearId, found: usize },

    /// Only the current owner may propose a transfer.
    #[error("transfer of {linear_id} may only be initiated by its current owner {owner}")]
    NotOwner {
        linear_id: LinearId,
        owner: PartyName,
    },

    /// The collected signature set does not equal the declared
    /// required-signer set, or a collected signature does not verify.
    #[error("signer mismatch on {intent} of {linear_id}: {details}")]
    SignerMismatch {
        intent: Intent,
        linear_id: LinearId,
        details: String,
    },

    /// A counterparty refused to countersign; the whole collection aborts.
    #[error("counterparty {party} rejected {intent} of {linear_id}: {reason}")]
    SessionRejected {
        party: PartyName,
        intent: Intent,
        linear_id: LinearId,
        reason: String,
    },

    /// A bounded wait expired. Transient: re-propose.
    #[error("{intent} of {linear_id} timed out after {waited:?} waiting for {waiting_on}")]
    Timeout {
        waiting_on: String,
        intent: Intent,
        linear_id: LinearId,
        waited: Duration,
    },

    /// The notary observed a conflicting consumption of an input.
    /// Transient from the protocol's point of view: re-propose against the
    /// new ledger snapshot.
    #[error(
        "notarization conflict on {intent} of {linear_id}: input {reference} already consumed by {conflicting_tx}"
    )]
    NotarizationConflict {
        intent: Intent,
        linear_id: LinearId,
        reference: StateRef,
        conflicting_tx: TxHash,
    },

    /// The notary rejected the transaction for a non-conflict reason.
    #[error("notary rejected the transaction: {0}")]
    NotaryRejected(String),

    /// A session channel closed or misbehaved.
    #[error("session transport failure: {0}")]
    Transport(String),

    #[error(transparent)]
    Vault(#[from] VaultError),
}
