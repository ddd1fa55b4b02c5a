//! Transaction proposal builders.
//!
//! Builders assemble a candidate transaction for a given intent and run it
//! through the contract validator before returning. A proposal that has not
//! passed the validator is never handed to the signing stage.

use accord_contract::{
    verify_proposal, Command, InputState, Intent, TokenState, TransactionProposal,
};
use accord_types::{Amount, LinearId, Party};
use accord_vault::VaultReader;

use crate::error::FlowError;

/// Build a validated issue proposal: a fresh record with a newly generated
/// linear id, no inputs, and the issuer as sole required signer.
///
/// Fails fast with [`FlowError::InvalidAmount`] on a non-positive quantity,
/// before the contract ever runs.
pub fn build_issue(amount: Amount, issuer: &Party) -> Result<TransactionProposal, FlowError> {
    if amount.is_zero() {
        return Err(FlowError::InvalidAmount);
    }
    let state = TokenState::new(amount, issuer.clone(), LinearId::generate());
    let signers: Vec<_> = state.participants().iter().map(|p| p.key).collect();
    let proposal =
        TransactionProposal::new(vec![], vec![state], Command::new(Intent::Issue, signers));
    verify_proposal(&proposal)?;
    Ok(proposal)
}

/// Build a validated transfer proposal for the live record of `linear_id`.
///
/// The current record is resolved through the vault collaborator; zero or
/// several live versions fail with [`FlowError::RecordNotFound`] — ambiguous
/// ledger state is never silently resolved. Only the current owner may
/// propose ([`FlowError::NotOwner`]). The successor record is built from the
/// already-resolved `new_owner` party, so the produced owner always equals
/// the party the signature session will be opened with.
pub fn build_transfer(
    linear_id: LinearId,
    new_owner: &Party,
    initiator: &Party,
    vault: &dyn VaultReader,
) -> Result<TransactionProposal, FlowError> {
    let mut candidates = vault.live_by_linear_id(&linear_id)?;
    if candidates.len() != 1 {
        return Err(FlowError::RecordNotFound {
            linear_id,
            found: candidates.len(),
        });
    }
    let (reference, input) = candidates.remove(0);

    if input.owner != *initiator {
        return Err(FlowError::NotOwner {
            linear_id,
            owner: input.owner.name.clone(),
        });
    }

    let output = input.with_new_owner(new_owner.clone());
    let signers: Vec<_> = input
        .participants()
        .iter()
        .chain(output.participants().iter())
        .map(|p| p.key)
        .collect();
    let proposal = TransactionProposal::new(
        vec![InputState {
            reference,
            state: input,
        }],
        vec![output],
        Command::new(Intent::Transfer, signers),
    );
    verify_proposal(&proposal)?;
    Ok(proposal)
}
