//! Initiator-side flow drivers.

use accord_contract::{CommittedTransaction, Intent, SignedTransaction};
use accord_types::{Amount, LinearId, Party};

use crate::collect::{collect_signatures, FlowState};
use crate::context::{FlowContext, FlowLabel};
use crate::error::FlowError;
use crate::finality::finalize;
use crate::proposal::{build_issue, build_transfer};

/// Issue a fresh token to the local party: build, validate, sign, collect
/// (trivially, the issuer is the only participant) and notarize.
pub async fn issue_flow(
    ctx: &FlowContext,
    amount: Amount,
) -> Result<CommittedTransaction, FlowError> {
    let proposal = build_issue(amount, &ctx.local)?;
    let label = FlowLabel::new(Intent::Issue, proposal.outputs[0].linear_id);
    run_to_finality(ctx, proposal, label).await
}

/// Transfer the live record of `linear_id` to `new_owner`: build against the
/// current vault snapshot, validate, sign, collect the new owner's
/// countersignature, and notarize.
///
/// `new_owner` must already be resolved through the identity collaborator —
/// the flow never guesses at identities.
pub async fn transfer_flow(
    ctx: &FlowContext,
    linear_id: LinearId,
    new_owner: &Party,
) -> Result<CommittedTransaction, FlowError> {
    let proposal = build_transfer(linear_id, new_owner, &ctx.local, ctx.vault.as_ref())?;
    let label = FlowLabel::new(Intent::Transfer, linear_id);
    run_to_finality(ctx, proposal, label).await
}

/// The shared tail of every initiating flow: local signature, signature
/// collection, finality.
async fn run_to_finality(
    ctx: &FlowContext,
    proposal: accord_contract::TransactionProposal,
    label: FlowLabel,
) -> Result<CommittedTransaction, FlowError> {
    let mut stx = SignedTransaction::new(proposal);
    let hash = stx.hash();
    stx.add_signature(ctx.local.key, ctx.sign(&hash));
    tracing::info!(flow = %label, %hash, state = ?FlowState::Proposed, "proposal signed locally");

    let (stx, sessions) = collect_signatures(ctx, stx, label).await?;
    finalize(ctx, stx, sessions, label).await
}
