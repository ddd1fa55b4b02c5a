//! Session payloads exchanged between initiator and counterparties.

use accord_contract::{CommittedTransaction, SignedTransaction};
use accord_types::{PublicKey, Signature};
use serde::{Deserialize, Serialize};

/// Everything that travels over a flow session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FlowMessage {
    /// Initiator → counterparty: the proposal, signed by the initiator,
    /// awaiting this counterparty's signature.
    SignRequest(SignedTransaction),

    /// Counterparty → initiator: the outcome of its independent checks.
    SignatureReply(SignatureReply),

    /// Initiator → counterparty: the notarized result, for recording.
    Committed(CommittedTransaction),

    /// Initiator → counterparty: the collection was aborted; discard state.
    Aborted { reason: String },
}

/// A counterparty's answer to a [`FlowMessage::SignRequest`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SignatureReply {
    Signed {
        key: PublicKey,
        signature: Signature,
    },
    Rejected {
        reason: String,
    },
}
