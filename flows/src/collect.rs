//! The distributed signature collection protocol.
//!
//! One session per required counterparty, all conducted concurrently; the
//! aggregation point enforces the exact-signer-set rule. Collection is
//! atomic: either every required signature arrives and verifies, or the
//! whole transaction is abandoned — a partially signed transaction is never
//! a valid outcome.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;

use accord_contract::{SignedTransaction, TransactionProposal};
use accord_types::{Party, PartyName, PublicKey, Signature};

use crate::context::{FlowContext, FlowLabel};
use crate::error::FlowError;
use crate::message::{FlowMessage, SignatureReply};
use crate::session::Session;

/// Lifecycle of one flow instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    /// Built, contract-validated and locally signed.
    Proposed,
    /// Counterparty sessions are open; responses outstanding.
    AwaitingSignatures,
    /// Every required signer has produced a valid signature over the hash
    /// agreed at `Proposed`.
    FullySigned,
    /// A counterparty refused, a wait expired, or a session broke.
    Rejected,
}

/// Outcome of a single counterparty session.
enum SessionOutcome {
    Signed {
        session: Session,
        key: PublicKey,
        signature: Signature,
    },
    Rejected {
        party: PartyName,
        reason: String,
    },
    TimedOut {
        party: PartyName,
        waited: Duration,
    },
    Broken {
        party: PartyName,
        detail: String,
    },
    Cancelled,
}

/// Drive signature collection for a locally signed transaction.
///
/// Opens a session with every required signer other than the local party,
/// fans the requests out concurrently, and joins the responses. The first
/// rejection, timeout or broken session cancels all other pending sessions
/// via a shared watch signal and fails the collection; counterparties that
/// already signed are told the transaction was abandoned. Arrival order is
/// irrelevant — the signer-set check runs once, after all responses.
///
/// On success returns the fully signed transaction together with the open
/// sessions, so finality can distribute the committed result over them.
pub async fn collect_signatures(
    ctx: &FlowContext,
    mut stx: SignedTransaction,
    label: FlowLabel,
) -> Result<(SignedTransaction, Vec<Session>), FlowError> {
    let required = stx.proposal.required_signers();
    let participants = participants_by_key(&stx.proposal);

    let mut counterparties = Vec::new();
    for key in &required {
        if *key == ctx.local.key {
            continue;
        }
        match participants.get(key) {
            Some(party) => counterparties.push(party.clone()),
            None => {
                return Err(FlowError::SignerMismatch {
                    intent: label.intent,
                    linear_id: label.linear_id,
                    details: format!("declared signer {key} is not a transaction participant"),
                })
            }
        }
    }

    tracing::info!(
        flow = %label,
        state = ?FlowState::AwaitingSignatures,
        counterparties = counterparties.len(),
        "collecting signatures"
    );

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let mut tasks = JoinSet::new();
    for counterparty in counterparties {
        let session = ctx.transport.open_session(&ctx.local, &counterparty)?;
        tasks.spawn(request_signature(
            session,
            stx.clone(),
            ctx.config.sign_timeout(),
            cancel_rx.clone(),
        ));
    }
    drop(cancel_rx);

    let mut sessions = Vec::new();
    let mut collected = Vec::new();
    let mut failure: Option<FlowError> = None;
    let fail = |error: FlowError, failure: &mut Option<FlowError>| {
        if failure.is_none() {
            *failure = Some(error);
            let _ = cancel_tx.send(true);
        }
    };

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(SessionOutcome::Signed {
                session,
                key,
                signature,
            }) => {
                collected.push((key, signature));
                sessions.push(session);
            }
            Ok(SessionOutcome::Rejected { party, reason }) => fail(
                FlowError::SessionRejected {
                    party,
                    intent: label.intent,
                    linear_id: label.linear_id,
                    reason,
                },
                &mut failure,
            ),
            Ok(SessionOutcome::TimedOut { party, waited }) => fail(
                FlowError::Timeout {
                    waiting_on: format!("signature from {party}"),
                    intent: label.intent,
                    linear_id: label.linear_id,
                    waited,
                },
                &mut failure,
            ),
            Ok(SessionOutcome::Broken { party, detail }) => fail(
                FlowError::Transport(format!("session with {party}: {detail}")),
                &mut failure,
            ),
            Ok(SessionOutcome::Cancelled) => {}
            Err(join_error) => fail(
                FlowError::Transport(format!("session task failed: {join_error}")),
                &mut failure,
            ),
        }
    }

    if let Some(error) = failure {
        tracing::warn!(flow = %label, state = ?FlowState::Rejected, error = %error, "signature collection aborted");
        // Counterparties that already signed are waiting for the committed
        // result; tell them the transaction was abandoned.
        for session in &sessions {
            let _ = session
                .send(FlowMessage::Aborted {
                    reason: error.to_string(),
                })
                .await;
        }
        return Err(error);
    }

    for (key, signature) in collected {
        stx.add_signature(key, signature);
    }
    verify_fully_signed(&stx, label)?;

    tracing::info!(flow = %label, state = ?FlowState::FullySigned, "all signatures collected");
    Ok((stx, sessions))
}

/// Check the collected signature set against the declared required-signer
/// set: exact key equality, and every signature verifies over the proposal
/// hash.
pub fn verify_fully_signed(stx: &SignedTransaction, label: FlowLabel) -> Result<(), FlowError> {
    let required = stx.proposal.required_signers();
    let collected = stx.signer_keys();
    if collected != required {
        let missing: Vec<String> = required
            .difference(&collected)
            .map(|k| k.to_string())
            .collect();
        let unexpected: Vec<String> = collected
            .difference(&required)
            .map(|k| k.to_string())
            .collect();
        return Err(FlowError::SignerMismatch {
            intent: label.intent,
            linear_id: label.linear_id,
            details: format!(
                "missing [{}], unexpected [{}]",
                missing.join(", "),
                unexpected.join(", ")
            ),
        });
    }
    for key in &required {
        if !stx.signature_valid_for(key) {
            return Err(FlowError::SignerMismatch {
                intent: label.intent,
                linear_id: label.linear_id,
                details: format!("signature from {key} does not verify"),
            });
        }
    }
    Ok(())
}

/// One counterparty session: send the request, then wait for the reply, a
/// cancellation, or the timeout — whichever comes first.
async fn request_signature(
    mut session: Session,
    request: SignedTransaction,
    timeout: Duration,
    mut cancel: watch::Receiver<bool>,
) -> SessionOutcome {
    let party = session.counterparty.name.clone();
    let expected_key = session.counterparty.key;

    if let Err(error) = session.send(FlowMessage::SignRequest(request)).await {
        return SessionOutcome::Broken {
            party,
            detail: error.to_string(),
        };
    }

    tokio::select! {
        _ = cancel.changed() => {
            let _ = session
                .send(FlowMessage::Aborted {
                    reason: "signature collection aborted".into(),
                })
                .await;
            SessionOutcome::Cancelled
        }
        reply = tokio::time::timeout(timeout, session.recv()) => match reply {
            Err(_) => SessionOutcome::TimedOut {
                party,
                waited: timeout,
            },
            Ok(None) => SessionOutcome::Broken {
                party,
                detail: "session closed before replying".into(),
            },
            Ok(Some(FlowMessage::SignatureReply(SignatureReply::Signed { key, signature }))) => {
                if key == expected_key {
                    SessionOutcome::Signed {
                        session,
                        key,
                        signature,
                    }
                } else {
                    SessionOutcome::Broken {
                        party,
                        detail: "reply signed with an unexpected key".into(),
                    }
                }
            }
            Ok(Some(FlowMessage::SignatureReply(SignatureReply::Rejected { reason }))) => {
                SessionOutcome::Rejected { party, reason }
            }
            Ok(Some(_)) => SessionOutcome::Broken {
                party,
                detail: "unexpected message during signature collection".into(),
            },
        }
    }
}

/// Every participant of the transaction, keyed by signing key. Declared
/// signers must resolve through this map to become session counterparties.
fn participants_by_key(proposal: &TransactionProposal) -> BTreeMap<PublicKey, Party> {
    let mut map = BTreeMap::new();
    for input in &proposal.inputs {
        for p in input.state.participants() {
            map.insert(p.key, p.clone());
        }
    }
    for output in &proposal.outputs {
        for p in output.participants() {
            map.insert(p.key, p.clone());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowConfig;
    use crate::notary::{NotaryClient, NotaryError};
    use crate::proposal::{build_issue, build_transfer};
    use crate::session::SessionTransport;
    use accord_contract::{CommittedTransaction, Intent};
    use accord_types::{Amount, Commodity, KeyPair, PartyName, Timestamp};
    use accord_vault::{MemoryVault, VaultWriter};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// How a scripted counterparty reacts to a sign request.
    #[derive(Clone, Copy)]
    enum Behavior {
        Sign,
        Reject,
        Ignore,
        SignWithWrongKey,
    }

    struct ScriptedTransport {
        seeds: HashMap<PartyName, [u8; 32]>,
        behavior: Behavior,
    }

    impl SessionTransport for ScriptedTransport {
        fn open_session(&self, local: &Party, counterparty: &Party) -> Result<Session, FlowError> {
            let (mine, mut theirs) = Session::pair(local.clone(), counterparty.clone());
            let seed = self.seeds[&counterparty.name];
            let behavior = self.behavior;
            tokio::spawn(async move {
                let Some(FlowMessage::SignRequest(stx)) = theirs.recv().await else {
                    return;
                };
                let hash = stx.hash();
                let reply = match behavior {
                    Behavior::Sign => {
                        let kp = accord_crypto::keypair_from_seed(&seed);
                        SignatureReply::Signed {
                            key: kp.public,
                            signature: accord_crypto::sign_hash(&hash, &kp.private),
                        }
                    }
                    Behavior::SignWithWrongKey => {
                        let kp = accord_crypto::keypair_from_seed(&[0xEE; 32]);
                        SignatureReply::Signed {
                            key: kp.public,
                            signature: accord_crypto::sign_hash(&hash, &kp.private),
                        }
                    }
                    Behavior::Reject => SignatureReply::Rejected {
                        reason: "not today".into(),
                    },
                    Behavior::Ignore => {
                        // Hold the session open without ever replying.
                        let _ = theirs.recv().await;
                        return;
                    }
                };
                let _ = theirs.send(FlowMessage::SignatureReply(reply)).await;
            });
            Ok(mine)
        }
    }

    struct UnusedNotary;

    #[async_trait]
    impl NotaryClient for UnusedNotary {
        async fn submit(
            &self,
            _tx: &SignedTransaction,
        ) -> Result<CommittedTransaction, NotaryError> {
            Err(NotaryError::Rejected("not under test".into()))
        }
    }

    fn party(name: &str, seed: u8) -> (Party, KeyPair) {
        let kp = accord_crypto::keypair_from_seed(&[seed; 32]);
        (Party::new(PartyName::new(name), kp.public), kp)
    }

    fn gold(quantity: u128) -> Amount {
        Amount::new(quantity, Commodity::new("GOLD", "Gold bullion"))
    }

    fn context(behavior: Behavior) -> (FlowContext, Party) {
        let (a, a_keys) = party("PartyA", 1);
        let (b, _) = party("PartyB", 2);
        let mut seeds = HashMap::new();
        seeds.insert(PartyName::new("PartyB"), [2u8; 32]);
        let ctx = FlowContext {
            local: a.clone(),
            keys: a_keys,
            vault: Arc::new(MemoryVault::new()),
            transport: Arc::new(ScriptedTransport { seeds, behavior }),
            notary: Arc::new(UnusedNotary),
            config: FlowConfig {
                sign_timeout_secs: 1,
                notary_timeout_secs: 1,
            },
        };
        (ctx, b)
    }

    /// A locally signed transfer proposal from PartyA to PartyB.
    fn signed_transfer(ctx: &FlowContext, new_owner: &Party) -> (SignedTransaction, FlowLabel) {
        let issue = build_issue(gold(100), &ctx.local).unwrap();
        let linear_id = issue.outputs[0].linear_id;
        ctx.vault
            .record_committed(&CommittedTransaction {
                id: issue.hash(),
                tx: SignedTransaction::new(issue),
                committed_at: Timestamp::new(1000),
            })
            .unwrap();

        let proposal =
            build_transfer(linear_id, new_owner, &ctx.local, ctx.vault.as_ref()).unwrap();
        let mut stx = SignedTransaction::new(proposal);
        let hash = stx.hash();
        stx.add_signature(ctx.local.key, ctx.sign(&hash));
        (stx, FlowLabel::new(Intent::Transfer, linear_id))
    }

    #[tokio::test]
    async fn all_counterparties_sign() {
        let (ctx, b) = context(Behavior::Sign);
        let (stx, label) = signed_transfer(&ctx, &b);

        let (stx, sessions) = collect_signatures(&ctx, stx, label).await.unwrap();
        assert!(stx.is_fully_signed());
        assert_eq!(stx.signatures.len(), 2);
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn issue_has_no_counterparties() {
        let (ctx, _) = context(Behavior::Sign);
        let proposal = build_issue(gold(100), &ctx.local).unwrap();
        let label = FlowLabel::new(Intent::Issue, proposal.outputs[0].linear_id);
        let mut stx = SignedTransaction::new(proposal);
        let hash = stx.hash();
        stx.add_signature(ctx.local.key, ctx.sign(&hash));

        let (stx, sessions) = collect_signatures(&ctx, stx, label).await.unwrap();
        assert!(stx.is_fully_signed());
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn rejection_aborts_collection() {
        let (ctx, b) = context(Behavior::Reject);
        let (stx, label) = signed_transfer(&ctx, &b);

        let result = collect_signatures(&ctx, stx, label).await;
        assert!(matches!(result, Err(FlowError::SessionRejected { .. })));
    }

    #[tokio::test]
    async fn unresponsive_counterparty_times_out() {
        let (ctx, b) = context(Behavior::Ignore);
        let (stx, label) = signed_transfer(&ctx, &b);

        let result = collect_signatures(&ctx, stx, label).await;
        assert!(matches!(result, Err(FlowError::Timeout { .. })));
    }

    #[tokio::test]
    async fn wrong_key_in_reply_is_rejected() {
        let (ctx, b) = context(Behavior::SignWithWrongKey);
        let (stx, label) = signed_transfer(&ctx, &b);

        let result = collect_signatures(&ctx, stx, label).await;
        assert!(matches!(result, Err(FlowError::Transport(_))));
    }

    #[tokio::test]
    async fn missing_initiator_signature_is_signer_mismatch() {
        let (ctx, b) = context(Behavior::Sign);
        let (mut stx, label) = signed_transfer(&ctx, &b);
        // Drop the initiator's own signature before collection.
        stx.signatures.clear();

        let result = collect_signatures(&ctx, stx, label).await;
        assert!(matches!(result, Err(FlowError::SignerMismatch { .. })));
    }
}
