//! Counterparty-side flow logic.
//!
//! A responder never trusts the initiator: it re-runs the contract
//! validator, applies its own business policy, and verifies the initiator's
//! signature before countersigning. Each protocol injects its policy as a
//! small single-method capability rather than embedding anonymous checks.

use accord_contract::{verify_proposal, CommittedTransaction, Intent, TransactionProposal};
use accord_types::Party;
use accord_vault::VaultWriter;

use crate::collect::verify_fully_signed;
use crate::context::{FlowContext, FlowLabel};
use crate::error::FlowError;
use crate::message::{FlowMessage, SignatureReply};
use crate::session::Session;

/// Party-local business check, run after the contract validator accepts.
///
/// Returning `Err(reason)` rejects the transaction; the reason travels back
/// to the initiator verbatim.
pub trait ResponderPolicy: Send + Sync {
    fn validate(&self, proposal: &TransactionProposal, local: &Party) -> Result<(), String>;
}

/// The default token policy: issues are acceptable as long as the contract
/// holds; a transfer is only co-signed by the party named as its new owner.
pub struct TokenResponderPolicy;

impl ResponderPolicy for TokenResponderPolicy {
    fn validate(&self, proposal: &TransactionProposal, local: &Party) -> Result<(), String> {
        match proposal.commands.first().map(|c| c.intent) {
            None => Err("not a token transaction".into()),
            Some(Intent::Issue) => Ok(()),
            Some(Intent::Transfer) => {
                if proposal.outputs.first().map(|o| &o.owner) == Some(local) {
                    Ok(())
                } else {
                    Err("local party is not the transfer's named new owner".into())
                }
            }
        }
    }
}

/// What a responder session ended as.
#[derive(Debug)]
pub enum ResponderOutcome {
    /// The transaction was countersigned and the notarized result recorded.
    Committed(CommittedTransaction),
    /// The local checks failed; the initiator was told why.
    Rejected { reason: String },
    /// The initiator abandoned the collection after we signed.
    Aborted { reason: String },
}

/// Handle one incoming flow session to completion.
///
/// Waits for the sign request, runs the independent checks, countersigns or
/// rejects, and — after signing — waits for the committed result and records
/// it in the local vault. All waits are bounded.
pub async fn respond_once(
    ctx: &FlowContext,
    session: &mut Session,
    policy: &dyn ResponderPolicy,
) -> Result<ResponderOutcome, FlowError> {
    let request = tokio::time::timeout(ctx.config.sign_timeout(), session.recv())
        .await
        .map_err(|_| FlowError::Transport("no sign request received in time".into()))?;
    let stx = match request {
        Some(FlowMessage::SignRequest(stx)) => stx,
        Some(_) => {
            return Err(FlowError::Transport(
                "expected a sign request as the first session message".into(),
            ))
        }
        None => return Err(FlowError::Transport("session closed before a request".into())),
    };

    if let Err(reason) = check_transaction(ctx, session, &stx.proposal, policy, &stx) {
        tracing::info!(
            initiator = %session.counterparty,
            %reason,
            "rejecting sign request"
        );
        session
            .send(FlowMessage::SignatureReply(SignatureReply::Rejected {
                reason: reason.clone(),
            }))
            .await?;
        return Ok(ResponderOutcome::Rejected { reason });
    }

    // Safe to index: the contract validator guarantees exactly one command
    // and exactly one output for both intents.
    let label = FlowLabel::new(
        stx.proposal.commands[0].intent,
        stx.proposal.outputs[0].linear_id,
    );
    let hash = stx.hash();
    let signature = ctx.sign(&hash);
    session
        .send(FlowMessage::SignatureReply(SignatureReply::Signed {
            key: ctx.local.key,
            signature,
        }))
        .await?;
    tracing::info!(flow = %label, initiator = %session.counterparty, "countersigned");

    // The initiator may still be collecting other signatures before it can
    // notarize, so the bound covers both remaining stages.
    let wait = ctx.config.sign_timeout() + ctx.config.notary_timeout();
    let outcome = tokio::time::timeout(wait, session.recv())
        .await
        .map_err(|_| FlowError::Timeout {
            waiting_on: "committed transaction".into(),
            intent: label.intent,
            linear_id: label.linear_id,
            waited: wait,
        })?;

    match outcome {
        Some(FlowMessage::Committed(committed)) => {
            if committed.tx.proposal != stx.proposal {
                return Err(FlowError::Transport(
                    "committed transaction does not match the signed proposal".into(),
                ));
            }
            verify_fully_signed(&committed.tx, label)?;
            ctx.vault.record_committed(&committed)?;
            tracing::info!(flow = %label, id = %committed.id, "recorded committed transaction");
            Ok(ResponderOutcome::Committed(committed))
        }
        Some(FlowMessage::Aborted { reason }) => {
            tracing::info!(flow = %label, %reason, "collection aborted by initiator");
            Ok(ResponderOutcome::Aborted { reason })
        }
        Some(_) => Err(FlowError::Transport(
            "unexpected message while waiting for the committed transaction".into(),
        )),
        None => Err(FlowError::Transport(
            "session closed before the committed transaction arrived".into(),
        )),
    }
}

/// The responder's independent validation: contract, business policy,
/// signer-set membership, and the initiator's own signature.
fn check_transaction(
    ctx: &FlowContext,
    session: &Session,
    proposal: &TransactionProposal,
    policy: &dyn ResponderPolicy,
    stx: &accord_contract::SignedTransaction,
) -> Result<(), String> {
    verify_proposal(proposal).map_err(|e| e.to_string())?;
    policy.validate(proposal, &ctx.local)?;
    if !proposal.required_signers().contains(&ctx.local.key) {
        return Err("local party is not a required signer of this transaction".into());
    }
    if !stx.signature_valid_for(&session.counterparty.key) {
        return Err("initiator signature missing or invalid".into());
    }
    Ok(())
}
