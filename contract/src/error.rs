//! Contract validation errors.

use thiserror::Error;

/// Failure of the pure contract check over a proposed transaction.
///
/// A transaction that fails this check must never be signed or submitted;
/// both the initiator and every counterparty run the same predicate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    /// A rule of the declared intent was violated; the message names the
    /// unmet clause.
    #[error("contract violation: {0}")]
    Violation(&'static str),

    /// The proposal does not carry exactly one recognized token command.
    #[error("unsupported intent: {0}")]
    UnsupportedIntent(&'static str),
}
