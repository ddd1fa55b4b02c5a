//! Token record, transaction types and the contract validator.
//!
//! The contract is a pure predicate over a proposed transaction: consumed
//! records, produced records, a declared intent and a declared signer set.
//! It has no access to the ledger, the network or the clock — every caller
//! (initiator and each counterparty independently) runs the same check
//! before signing.

pub mod contract;
pub mod error;
pub mod state;
pub mod transaction;

pub use contract::verify_proposal;
pub use error::ContractError;
pub use state::{StateRef, TokenState};
pub use transaction::{
    Command, CommittedTransaction, InputState, Intent, SignedTransaction, TransactionProposal,
};
