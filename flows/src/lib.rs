//! The multi-party transaction flows.
//!
//! A flow instance is one party's sequential procedure for getting a single
//! transaction from proposal to notarized finality:
//!
//! 1. build the proposal and validate it against the contract
//! 2. sign it locally (`Proposed`)
//! 3. open one session per required counterparty and collect their
//!    signatures concurrently (`AwaitingSignatures`)
//! 4. check the collected signer set is exactly the declared one
//!    (`FullySigned`)
//! 5. submit to the notary and distribute the committed result
//!
//! Counterparties run [`responder::respond_once`], which re-validates the
//! transaction independently before countersigning — an initiator's word is
//! never trusted. Any rejection aborts the whole collection; no partially
//! signed transaction ever reaches the notary.

pub mod collect;
pub mod config;
pub mod context;
pub mod error;
pub mod finality;
pub mod initiator;
pub mod message;
pub mod notary;
pub mod proposal;
pub mod responder;
pub mod session;

pub use collect::{collect_signatures, FlowState};
pub use config::FlowConfig;
pub use context::{FlowContext, FlowLabel};
pub use error::FlowError;
pub use finality::finalize;
pub use initiator::{issue_flow, transfer_flow};
pub use message::{FlowMessage, SignatureReply};
pub use notary::{NotaryClient, NotaryError};
pub use proposal::{build_issue, build_transfer};
pub use responder::{respond_once, ResponderOutcome, ResponderPolicy, TokenResponderPolicy};
pub use session::{Session, SessionTransport};
