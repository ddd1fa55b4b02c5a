//! Finality submission: notarize and distribute.

use accord_contract::{CommittedTransaction, SignedTransaction};
use accord_vault::VaultWriter;

use crate::collect::{verify_fully_signed, FlowState};
use crate::context::{FlowContext, FlowLabel};
use crate::error::FlowError;
use crate::message::FlowMessage;
use crate::notary::NotaryError;
use crate::session::Session;

/// Submit a fully signed transaction to the notary and distribute the
/// committed result to every counterparty session.
///
/// The notary call is atomic from this side: it either commits (returning
/// the committed identifier and timestamp) or rejects. A conflict on a
/// consumed input is an expected outcome under concurrent transfers and is
/// surfaced as [`FlowError::NotarizationConflict`]; the caller re-proposes
/// against the fresh ledger snapshot rather than retrying the same payload,
/// whose validity window has passed.
pub async fn finalize(
    ctx: &FlowContext,
    stx: SignedTransaction,
    sessions: Vec<Session>,
    label: FlowLabel,
) -> Result<CommittedTransaction, FlowError> {
    // Never hand the notary anything short of fully signed.
    verify_fully_signed(&stx, label)?;

    let outcome = tokio::time::timeout(ctx.config.notary_timeout(), ctx.notary.submit(&stx)).await;
    let committed = match outcome {
        Err(_) => Err(FlowError::Timeout {
            waiting_on: "notary commit".into(),
            intent: label.intent,
            linear_id: label.linear_id,
            waited: ctx.config.notary_timeout(),
        }),
        Ok(Err(NotaryError::Conflict {
            reference,
            conflicting_tx,
        })) => {
            tracing::warn!(flow = %label, %reference, "notarization conflict");
            Err(FlowError::NotarizationConflict {
                intent: label.intent,
                linear_id: label.linear_id,
                reference,
                conflicting_tx,
            })
        }
        Ok(Err(NotaryError::Rejected(reason))) => Err(FlowError::NotaryRejected(reason)),
        Ok(Ok(committed)) => Ok(committed),
    };

    // Counterparties that countersigned are waiting for the result; a
    // notary failure must release them rather than leave them to time out.
    let committed = match committed {
        Ok(committed) => committed,
        Err(error) => {
            for session in &sessions {
                let _ = session
                    .send(FlowMessage::Aborted {
                        reason: error.to_string(),
                    })
                    .await;
            }
            return Err(error);
        }
    };

    ctx.vault.record_committed(&committed)?;

    // Distribution is best-effort: the transaction is committed regardless,
    // and a counterparty that missed it can recover it from the notary's log.
    for session in &sessions {
        if let Err(error) = session
            .send(FlowMessage::Committed(committed.clone()))
            .await
        {
            tracing::warn!(
                flow = %label,
                counterparty = %session.counterparty,
                %error,
                "failed to distribute committed transaction"
            );
        }
    }

    tracing::info!(flow = %label, id = %committed.id, state = ?FlowState::FullySigned, "transaction committed");
    Ok(committed)
}
