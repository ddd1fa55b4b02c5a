//! The pure contract validator.

use std::collections::BTreeSet;

use accord_types::PublicKey;

use crate::error::ContractError;
use crate::transaction::{Command, Intent, TransactionProposal};

/// Verify a proposed transaction against the token contract.
///
/// Side-effect free: the proposal carries everything the rules need
/// (consumed records, produced records, intent, declared signer set).
pub fn verify_proposal(proposal: &TransactionProposal) -> Result<(), ContractError> {
    let command = match proposal.commands.as_slice() {
        [command] => command,
        [] => {
            return Err(ContractError::UnsupportedIntent(
                "a token transaction must declare exactly one command, found none",
            ))
        }
        _ => {
            return Err(ContractError::UnsupportedIntent(
                "a token transaction must declare exactly one command, found several",
            ))
        }
    };

    match command.intent {
        Intent::Issue => verify_issue(proposal, command),
        Intent::Transfer => verify_transfer(proposal, command),
    }
}

fn verify_issue(proposal: &TransactionProposal, command: &Command) -> Result<(), ContractError> {
    if !proposal.inputs.is_empty() {
        return Err(ContractError::Violation(
            "no inputs may be consumed when issuing a token",
        ));
    }
    if proposal.outputs.len() != 1 {
        return Err(ContractError::Violation(
            "exactly one output must be created when issuing a token",
        ));
    }
    let output = &proposal.outputs[0];
    if output.amount.is_zero() {
        return Err(ContractError::Violation(
            "a newly issued token must have a positive amount",
        ));
    }
    let participant_keys: BTreeSet<PublicKey> =
        output.participants().iter().map(|p| p.key).collect();
    if command.signers != participant_keys {
        return Err(ContractError::Violation(
            "all of the output's participants, and only they, must sign an issue",
        ));
    }
    Ok(())
}

fn verify_transfer(proposal: &TransactionProposal, command: &Command) -> Result<(), ContractError> {
    if proposal.inputs.len() != 1 {
        return Err(ContractError::Violation(
            "a transfer must consume exactly one input",
        ));
    }
    if proposal.outputs.len() != 1 {
        return Err(ContractError::Violation(
            "a transfer must create exactly one output",
        ));
    }
    let input = &proposal.inputs[0].state;
    let output = &proposal.outputs[0];

    // Substituting the old owner back must make the records identical:
    // amount and linear id are untouched by a transfer.
    if *input != output.with_new_owner(input.owner.clone()) {
        return Err(ContractError::Violation(
            "only the owner property may change in a transfer",
        ));
    }
    if input.owner == output.owner {
        return Err(ContractError::Violation(
            "the owner property must change in a transfer",
        ));
    }

    let required: BTreeSet<PublicKey> = input
        .participants()
        .iter()
        .chain(output.participants().iter())
        .map(|p| p.key)
        .collect();
    if command.signers != required {
        return Err(ContractError::Violation(
            "the old owner and the new owner together, and only they, must sign a transfer",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateRef, TokenState};
    use crate::transaction::InputState;
    use accord_types::{Amount, Commodity, LinearId, Party, PartyName, TxHash};

    fn party(name: &str, key_byte: u8) -> Party {
        Party::new(PartyName::new(name), PublicKey([key_byte; 32]))
    }

    fn gold(quantity: u128) -> Amount {
        Amount::new(quantity, Commodity::new("GOLD", "Gold bullion"))
    }

    fn token(quantity: u128, owner: &Party) -> TokenState {
        TokenState::new(gold(quantity), owner.clone(), LinearId::new([7u8; 16]))
    }

    fn input_for(state: TokenState) -> InputState {
        InputState {
            reference: StateRef::new(TxHash::new([1u8; 32]), 0),
            state,
        }
    }

    fn issue(output: TokenState, signers: Vec<PublicKey>) -> TransactionProposal {
        TransactionProposal::new(vec![], vec![output], Command::new(Intent::Issue, signers))
    }

    fn transfer(
        input: TokenState,
        output: TokenState,
        signers: Vec<PublicKey>,
    ) -> TransactionProposal {
        TransactionProposal::new(
            vec![input_for(input)],
            vec![output],
            Command::new(Intent::Transfer, signers),
        )
    }

    // ── Command shape ───────────────────────────────────────────────────

    #[test]
    fn no_command_is_unsupported() {
        let a = party("PartyA", 1);
        let mut proposal = issue(token(100, &a), vec![a.key]);
        proposal.commands.clear();
        assert!(matches!(
            verify_proposal(&proposal),
            Err(ContractError::UnsupportedIntent(_))
        ));
    }

    #[test]
    fn multiple_commands_are_unsupported() {
        let a = party("PartyA", 1);
        let mut proposal = issue(token(100, &a), vec![a.key]);
        proposal
            .commands
            .push(Command::new(Intent::Transfer, [a.key]));
        assert!(matches!(
            verify_proposal(&proposal),
            Err(ContractError::UnsupportedIntent(_))
        ));
    }

    // ── Issue rules ─────────────────────────────────────────────────────

    #[test]
    fn valid_issue_passes() {
        let a = party("PartyA", 1);
        assert_eq!(verify_proposal(&issue(token(100, &a), vec![a.key])), Ok(()));
    }

    #[test]
    fn issue_must_not_consume_inputs() {
        let a = party("PartyA", 1);
        let mut proposal = issue(token(100, &a), vec![a.key]);
        proposal.inputs.push(input_for(token(100, &a)));
        assert_eq!(
            verify_proposal(&proposal),
            Err(ContractError::Violation(
                "no inputs may be consumed when issuing a token"
            ))
        );
    }

    #[test]
    fn issue_must_create_exactly_one_output() {
        let a = party("PartyA", 1);
        let mut proposal = issue(token(100, &a), vec![a.key]);
        proposal.outputs.push(token(50, &a));
        assert_eq!(
            verify_proposal(&proposal),
            Err(ContractError::Violation(
                "exactly one output must be created when issuing a token"
            ))
        );

        proposal.outputs.clear();
        assert_eq!(
            verify_proposal(&proposal),
            Err(ContractError::Violation(
                "exactly one output must be created when issuing a token"
            ))
        );
    }

    #[test]
    fn issue_amount_must_be_positive() {
        let a = party("PartyA", 1);
        assert_eq!(
            verify_proposal(&issue(token(0, &a), vec![a.key])),
            Err(ContractError::Violation(
                "a newly issued token must have a positive amount"
            ))
        );
    }

    #[test]
    fn issue_signers_must_match_participants_exactly() {
        let a = party("PartyA", 1);
        let b = party("PartyB", 2);

        // Missing the issuer.
        assert!(matches!(
            verify_proposal(&issue(token(100, &a), vec![b.key])),
            Err(ContractError::Violation(_))
        ));

        // Extra signer beyond the participants.
        assert!(matches!(
            verify_proposal(&issue(token(100, &a), vec![a.key, b.key])),
            Err(ContractError::Violation(_))
        ));
    }

    // ── Transfer rules ──────────────────────────────────────────────────

    #[test]
    fn valid_transfer_passes() {
        let a = party("PartyA", 1);
        let b = party("PartyB", 2);
        let input = token(100, &a);
        let output = input.with_new_owner(b.clone());
        assert_eq!(
            verify_proposal(&transfer(input, output, vec![a.key, b.key])),
            Ok(())
        );
    }

    #[test]
    fn transfer_must_consume_exactly_one_input() {
        let a = party("PartyA", 1);
        let b = party("PartyB", 2);
        let input = token(100, &a);
        let output = input.with_new_owner(b.clone());
        let mut proposal = transfer(input.clone(), output, vec![a.key, b.key]);

        proposal.inputs.clear();
        assert_eq!(
            verify_proposal(&proposal),
            Err(ContractError::Violation(
                "a transfer must consume exactly one input"
            ))
        );

        proposal.inputs = vec![input_for(input.clone()), input_for(input)];
        assert_eq!(
            verify_proposal(&proposal),
            Err(ContractError::Violation(
                "a transfer must consume exactly one input"
            ))
        );
    }

    #[test]
    fn transfer_must_create_exactly_one_output() {
        let a = party("PartyA", 1);
        let b = party("PartyB", 2);
        let input = token(100, &a);
        let output = input.with_new_owner(b.clone());
        let mut proposal = transfer(input, output.clone(), vec![a.key, b.key]);
        proposal.outputs.push(output);
        assert_eq!(
            verify_proposal(&proposal),
            Err(ContractError::Violation(
                "a transfer must create exactly one output"
            ))
        );
    }

    #[test]
    fn transfer_must_not_change_amount() {
        let a = party("PartyA", 1);
        let b = party("PartyB", 2);
        let input = token(100, &a);
        let mut output = input.with_new_owner(b.clone());
        output.amount = gold(99);
        assert_eq!(
            verify_proposal(&transfer(input, output, vec![a.key, b.key])),
            Err(ContractError::Violation(
                "only the owner property may change in a transfer"
            ))
        );
    }

    #[test]
    fn transfer_must_not_change_linear_id() {
        let a = party("PartyA", 1);
        let b = party("PartyB", 2);
        let input = token(100, &a);
        let mut output = input.with_new_owner(b.clone());
        output.linear_id = LinearId::new([8u8; 16]);
        assert_eq!(
            verify_proposal(&transfer(input, output, vec![a.key, b.key])),
            Err(ContractError::Violation(
                "only the owner property may change in a transfer"
            ))
        );
    }

    #[test]
    fn transfer_owner_must_actually_change() {
        let a = party("PartyA", 1);
        let input = token(100, &a);
        let output = input.clone();
        assert_eq!(
            verify_proposal(&transfer(input, output, vec![a.key])),
            Err(ContractError::Violation(
                "the owner property must change in a transfer"
            ))
        );
    }

    #[test]
    fn transfer_signers_must_be_old_and_new_owner_exactly() {
        let a = party("PartyA", 1);
        let b = party("PartyB", 2);
        let c = party("PartyC", 3);
        let input = token(100, &a);
        let output = input.with_new_owner(b.clone());

        // Old owner only.
        assert!(matches!(
            verify_proposal(&transfer(input.clone(), output.clone(), vec![a.key])),
            Err(ContractError::Violation(_))
        ));

        // New owner only.
        assert!(matches!(
            verify_proposal(&transfer(input.clone(), output.clone(), vec![b.key])),
            Err(ContractError::Violation(_))
        ));

        // A third party slipped into the signer set.
        assert!(matches!(
            verify_proposal(&transfer(input, output, vec![a.key, b.key, c.key])),
            Err(ContractError::Violation(_))
        ));
    }
}
