//! In-process session transport.
//!
//! Routes flow sessions between parties living in the same process: each
//! registered party owns an inbox of incoming sessions that its node's
//! responder loop drains. Wire transports would implement the same
//! [`SessionTransport`] seam.

use std::collections::HashMap;
use std::sync::RwLock;

use accord_flows::{FlowError, Session, SessionTransport};
use accord_types::{Party, PartyName};
use tokio::sync::mpsc;

/// Incoming sessions a party can buffer before opens start failing.
const INBOX_CAPACITY: usize = 64;

/// Session router for a set of in-process parties.
#[derive(Default)]
pub struct InProcessNetwork {
    inboxes: RwLock<HashMap<PartyName, mpsc::Sender<Session>>>,
}

impl InProcessNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a party and get the receiving end of its session inbox.
    pub fn register(&self, party: &Party) -> mpsc::Receiver<Session> {
        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        let mut inboxes = self.inboxes.write().expect("network lock poisoned");
        inboxes.insert(party.name.clone(), tx);
        rx
    }
}

impl SessionTransport for InProcessNetwork {
    fn open_session(&self, local: &Party, counterparty: &Party) -> Result<Session, FlowError> {
        let inbox = {
            let inboxes = self.inboxes.read().expect("network lock poisoned");
            inboxes.get(&counterparty.name).cloned()
        };
        let inbox = inbox.ok_or_else(|| {
            FlowError::Transport(format!("no session inbox for {}", counterparty.name))
        })?;

        let (local_end, remote_end) = Session::pair(local.clone(), counterparty.clone());
        inbox.try_send(remote_end).map_err(|_| {
            FlowError::Transport(format!("session inbox for {} unavailable", counterparty.name))
        })?;
        Ok(local_end)
    }
}
