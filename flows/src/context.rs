//! Per-party flow context: collaborator handles and local identity.

use std::fmt;
use std::sync::Arc;

use accord_contract::Intent;
use accord_types::{KeyPair, LinearId, Party, Signature, TxHash};
use accord_vault::VaultWriter;

use crate::config::FlowConfig;
use crate::notary::NotaryClient;
use crate::session::SessionTransport;

/// Everything a flow instance needs, passed in at construction — there is
/// no ambient service locator. All collaborators are trait objects so tests
/// and nodes can wire in whatever implementations they need.
pub struct FlowContext {
    /// The local party's resolved identity.
    pub local: Party,
    /// The local signing keys. `local.key` must equal `keys.public`.
    pub keys: KeyPair,
    pub vault: Arc<dyn VaultWriter>,
    pub transport: Arc<dyn SessionTransport>,
    pub notary: Arc<dyn NotaryClient>,
    pub config: FlowConfig,
}

impl FlowContext {
    /// Sign a transaction hash with the local private key.
    pub fn sign(&self, hash: &TxHash) -> Signature {
        accord_crypto::sign_hash(hash, &self.keys.private)
    }
}

/// The identity of one flow instance, used for logging and for error
/// context: which intent, over which token.
#[derive(Clone, Copy, Debug)]
pub struct FlowLabel {
    pub intent: Intent,
    pub linear_id: LinearId,
}

impl FlowLabel {
    pub fn new(intent: Intent, linear_id: LinearId) -> Self {
        Self { intent, linear_id }
    }
}

impl fmt::Display for FlowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.intent, self.linear_id)
    }
}
