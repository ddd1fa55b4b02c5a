//! The versioned token ownership record.

use accord_types::{Amount, LinearId, Party, TxHash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fact on the ledger: `owner` holds `amount` of a commodity.
///
/// Every version of the same token shares one `linear_id`; a transfer
/// consumes the current version and produces a successor that differs only
/// in `owner`. Records are never destroyed — consumption is a ledger-level
/// state transition owned by the vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub amount: Amount,
    pub owner: Party,
    pub linear_id: LinearId,
}

impl TokenState {
    pub fn new(amount: Amount, owner: Party, linear_id: LinearId) -> Self {
        Self {
            amount,
            owner,
            linear_id,
        }
    }

    /// The parties whose consent is required to mutate this record.
    ///
    /// At rest this is exactly the owner; a prospective new owner joins the
    /// signer set only transiently during a transfer.
    pub fn participants(&self) -> Vec<&Party> {
        vec![&self.owner]
    }

    /// The successor record for a transfer: same amount, same linear id,
    /// different owner.
    pub fn with_new_owner(&self, new_owner: Party) -> Self {
        Self {
            amount: self.amount.clone(),
            owner: new_owner,
            linear_id: self.linear_id,
        }
    }
}

impl fmt::Display for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} owned by {} [{}]",
            self.amount, self.owner, self.linear_id
        )
    }
}

/// A reference to a produced record on the ledger: the transaction that
/// created it plus its position in that transaction's outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    pub tx_hash: TxHash,
    pub output_index: u32,
}

impl StateRef {
    pub fn new(tx_hash: TxHash, output_index: u32) -> Self {
        Self {
            tx_hash,
            output_index,
        }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.output_index)
    }
}
