//! In-process notarization service.
//!
//! Implements the [`NotaryClient`] seam with the one guarantee the protocol
//! needs from a notary: a consumed input reference commits at most once,
//! globally. Ordering/consensus internals of a production notary are out of
//! scope — this reference keeps the consumed-reference index in memory.

use std::collections::HashMap;
use std::sync::Mutex;

use accord_contract::{CommittedTransaction, SignedTransaction, StateRef};
use accord_flows::{NotaryClient, NotaryError};
use accord_types::{Timestamp, TxHash};
use async_trait::async_trait;

#[derive(Default)]
pub struct InProcessNotary {
    consumed: Mutex<HashMap<StateRef, TxHash>>,
}

impl InProcessNotary {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotaryClient for InProcessNotary {
    async fn submit(&self, tx: &SignedTransaction) -> Result<CommittedTransaction, NotaryError> {
        if !tx.is_fully_signed() {
            return Err(NotaryError::Rejected(
                "transaction is not fully signed".into(),
            ));
        }

        let id = tx.hash();
        let mut consumed = self.consumed.lock().expect("notary lock poisoned");

        // Check every input before consuming any: the commit is atomic.
        for input in &tx.proposal.inputs {
            if let Some(conflicting_tx) = consumed.get(&input.reference) {
                if *conflicting_tx != id {
                    tracing::warn!(
                        reference = %input.reference,
                        %conflicting_tx,
                        "rejecting doubly-spent input"
                    );
                    return Err(NotaryError::Conflict {
                        reference: input.reference,
                        conflicting_tx: *conflicting_tx,
                    });
                }
            }
        }
        for input in &tx.proposal.inputs {
            consumed.insert(input.reference, id);
        }

        Ok(CommittedTransaction {
            id,
            tx: tx.clone(),
            committed_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_contract::{Command, InputState, Intent, TokenState, TransactionProposal};
    use accord_types::{Amount, Commodity, KeyPair, LinearId, Party, PartyName};

    fn party(name: &str, seed: u8) -> (Party, KeyPair) {
        let kp = accord_crypto::keypair_from_seed(&[seed; 32]);
        (Party::new(PartyName::new(name), kp.public), kp)
    }

    fn gold(quantity: u128) -> Amount {
        Amount::new(quantity, Commodity::new("GOLD", "Gold bullion"))
    }

    fn signed_issue(owner: &Party, keys: &KeyPair) -> SignedTransaction {
        let state = TokenState::new(gold(100), owner.clone(), LinearId::generate());
        let proposal = TransactionProposal::new(
            vec![],
            vec![state],
            Command::new(Intent::Issue, [owner.key]),
        );
        let mut stx = SignedTransaction::new(proposal);
        let hash = stx.hash();
        stx.add_signature(owner.key, accord_crypto::sign_hash(&hash, &keys.private));
        stx
    }

    /// A signed transfer consuming `reference`, from `owner` to `new_owner`.
    fn signed_transfer(
        reference: StateRef,
        input: TokenState,
        new_owner: &Party,
        owner_keys: &KeyPair,
        new_owner_keys: &KeyPair,
    ) -> SignedTransaction {
        let output = input.with_new_owner(new_owner.clone());
        let proposal = TransactionProposal::new(
            vec![InputState {
                reference,
                state: input.clone(),
            }],
            vec![output],
            Command::new(Intent::Transfer, [input.owner.key, new_owner.key]),
        );
        let mut stx = SignedTransaction::new(proposal);
        let hash = stx.hash();
        stx.add_signature(
            input.owner.key,
            accord_crypto::sign_hash(&hash, &owner_keys.private),
        );
        stx.add_signature(
            new_owner.key,
            accord_crypto::sign_hash(&hash, &new_owner_keys.private),
        );
        stx
    }

    #[tokio::test]
    async fn commits_a_fully_signed_issue() {
        let notary = InProcessNotary::new();
        let (a, a_keys) = party("PartyA", 1);
        let stx = signed_issue(&a, &a_keys);
        let committed = notary.submit(&stx).await.unwrap();
        assert_eq!(committed.id, stx.hash());
    }

    #[tokio::test]
    async fn rejects_partially_signed() {
        let notary = InProcessNotary::new();
        let (a, _) = party("PartyA", 1);
        let state = TokenState::new(gold(100), a.clone(), LinearId::generate());
        let proposal =
            TransactionProposal::new(vec![], vec![state], Command::new(Intent::Issue, [a.key]));
        let stx = SignedTransaction::new(proposal);

        let result = notary.submit(&stx).await;
        assert!(matches!(result, Err(NotaryError::Rejected(_))));
    }

    #[tokio::test]
    async fn conflicting_consumption_is_rejected() {
        let notary = InProcessNotary::new();
        let (a, a_keys) = party("PartyA", 1);
        let (b, b_keys) = party("PartyB", 2);
        let (c, c_keys) = party("PartyC", 3);

        let issue = signed_issue(&a, &a_keys);
        let committed = notary.submit(&issue).await.unwrap();
        let (reference, input) = committed.produced_records().remove(0);

        let to_b = signed_transfer(reference, input.clone(), &b, &a_keys, &b_keys);
        notary.submit(&to_b).await.unwrap();

        // The same input spent a second time must conflict.
        let to_c = signed_transfer(reference, input, &c, &a_keys, &c_keys);
        let result = notary.submit(&to_c).await;
        assert!(matches!(
            result,
            Err(NotaryError::Conflict { reference: r, .. }) if r == reference
        ));
    }

    #[tokio::test]
    async fn resubmitting_the_same_transaction_is_not_a_conflict() {
        let notary = InProcessNotary::new();
        let (a, a_keys) = party("PartyA", 1);
        let (b, b_keys) = party("PartyB", 2);

        let issue = signed_issue(&a, &a_keys);
        let committed = notary.submit(&issue).await.unwrap();
        let (reference, input) = committed.produced_records().remove(0);

        let to_b = signed_transfer(reference, input, &b, &a_keys, &b_keys);
        notary.submit(&to_b).await.unwrap();
        assert!(notary.submit(&to_b).await.is_ok());
    }
}
