//! Candidate, signed and committed transaction types.

use accord_types::{PublicKey, Signature, Timestamp, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::state::{StateRef, TokenState};

/// The declared kind of transaction, governing which contract rules apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Issue,
    Transfer,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Issue => write!(f, "issue"),
            Intent::Transfer => write!(f, "transfer"),
        }
    }
}

/// An intent paired with the key set that must sign for it.
///
/// Signer sets are `BTreeSet`s so the canonical encoding (and therefore the
/// transaction hash) does not depend on insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub intent: Intent,
    pub signers: BTreeSet<PublicKey>,
}

impl Command {
    pub fn new(intent: Intent, signers: impl IntoIterator<Item = PublicKey>) -> Self {
        Self {
            intent,
            signers: signers.into_iter().collect(),
        }
    }
}

/// A consumed record: its ledger reference plus the resolved state it had
/// when the proposal was built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub reference: StateRef,
    pub state: TokenState,
}

/// A candidate transaction: consumed records, produced records and the
/// declared intent with its required signer set.
///
/// Proposals are immutable once hashed — every signature in the collection
/// protocol is over [`TransactionProposal::hash`], fixed at proposal time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProposal {
    pub inputs: Vec<InputState>,
    pub outputs: Vec<TokenState>,
    pub commands: Vec<Command>,
}

impl TransactionProposal {
    pub fn new(inputs: Vec<InputState>, outputs: Vec<TokenState>, command: Command) -> Self {
        Self {
            inputs,
            outputs,
            commands: vec![command],
        }
    }

    /// The Blake2b-256 hash of the canonical (bincode) proposal encoding.
    pub fn hash(&self) -> TxHash {
        let bytes = bincode::serialize(self).expect("proposal is always serializable");
        accord_crypto::hash_transaction(&bytes)
    }

    /// The union of every command's declared signer set.
    pub fn required_signers(&self) -> BTreeSet<PublicKey> {
        self.commands
            .iter()
            .flat_map(|c| c.signers.iter().copied())
            .collect()
    }
}

/// A proposal plus the signatures collected so far.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub proposal: TransactionProposal,
    pub signatures: BTreeMap<PublicKey, Signature>,
}

impl SignedTransaction {
    pub fn new(proposal: TransactionProposal) -> Self {
        Self {
            proposal,
            signatures: BTreeMap::new(),
        }
    }

    pub fn hash(&self) -> TxHash {
        self.proposal.hash()
    }

    pub fn add_signature(&mut self, key: PublicKey, signature: Signature) {
        self.signatures.insert(key, signature);
    }

    /// The keys that have produced a signature.
    pub fn signer_keys(&self) -> BTreeSet<PublicKey> {
        self.signatures.keys().copied().collect()
    }

    /// Whether `key` has a cryptographically valid signature over this
    /// transaction's hash.
    pub fn signature_valid_for(&self, key: &PublicKey) -> bool {
        let hash = self.hash();
        self.signatures
            .get(key)
            .is_some_and(|sig| accord_crypto::verify_hash(&hash, sig, key))
    }

    /// Whether every collected signature verifies and the signer set equals
    /// the declared required-signer set exactly.
    pub fn is_fully_signed(&self) -> bool {
        let hash = self.hash();
        self.signer_keys() == self.proposal.required_signers()
            && self
                .signatures
                .iter()
                .all(|(key, sig)| accord_crypto::verify_hash(&hash, sig, key))
    }
}

/// A notarized transaction: the signed payload plus the committed identifier
/// and commit timestamp assigned by the notary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommittedTransaction {
    pub id: TxHash,
    pub tx: SignedTransaction,
    pub committed_at: Timestamp,
}

impl CommittedTransaction {
    /// The records this transaction produced, paired with their ledger
    /// references.
    pub fn produced_records(&self) -> Vec<(StateRef, TokenState)> {
        self.tx
            .proposal
            .outputs
            .iter()
            .enumerate()
            .map(|(i, state)| (StateRef::new(self.id, i as u32), state.clone()))
            .collect()
    }

    /// The ledger references this transaction consumed.
    pub fn consumed_refs(&self) -> Vec<StateRef> {
        self.tx
            .proposal
            .inputs
            .iter()
            .map(|input| input.reference)
            .collect()
    }
}
