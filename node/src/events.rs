//! Committed-transaction event bus.
//!
//! Every transaction a node records — initiated or countersigned — is
//! broadcast to subscribers, so presentation layers can observe ledger
//! updates without polling the vault.

use accord_contract::CommittedTransaction;
use tokio::sync::broadcast;

/// Buffered events per subscriber before lagging subscribers drop messages.
const BUS_CAPACITY: usize = 256;

pub struct CommitBus {
    tx: broadcast::Sender<CommittedTransaction>,
}

impl CommitBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CommittedTransaction> {
        self.tx.subscribe()
    }

    /// Publish a committed transaction. A bus with no subscribers is fine.
    pub fn publish(&self, committed: &CommittedTransaction) {
        let _ = self.tx.send(committed.clone());
    }
}

impl Default for CommitBus {
    fn default() -> Self {
        Self::new()
    }
}
