//! Bidirectional flow sessions and the transport collaborator.

use accord_types::Party;
use tokio::sync::mpsc;

use crate::error::FlowError;
use crate::message::FlowMessage;

/// Channel capacity per session direction. A flow exchanges a handful of
/// messages, so a small buffer suffices.
const SESSION_BUFFER: usize = 16;

/// One end of a bidirectional channel between two parties.
///
/// The same type serves both sides: for the initiator `counterparty` is the
/// responder, for the responder it is the initiator.
pub struct Session {
    pub counterparty: Party,
    tx: mpsc::Sender<FlowMessage>,
    rx: mpsc::Receiver<FlowMessage>,
}

impl Session {
    /// Create a connected pair of session ends.
    pub fn pair(initiator: Party, counterparty: Party) -> (Session, Session) {
        let (to_counterparty, from_initiator) = mpsc::channel(SESSION_BUFFER);
        let (to_initiator, from_counterparty) = mpsc::channel(SESSION_BUFFER);
        let initiator_end = Session {
            counterparty: counterparty.clone(),
            tx: to_counterparty,
            rx: from_counterparty,
        };
        let responder_end = Session {
            counterparty: initiator,
            tx: to_initiator,
            rx: from_initiator,
        };
        (initiator_end, responder_end)
    }

    pub async fn send(&self, message: FlowMessage) -> Result<(), FlowError> {
        self.tx.send(message).await.map_err(|_| {
            FlowError::Transport(format!("session to {} closed", self.counterparty.name))
        })
    }

    /// Receive the next message; `None` when the peer dropped its end.
    pub async fn recv(&mut self) -> Option<FlowMessage> {
        self.rx.recv().await
    }
}

/// The identity/peer-session collaborator: opens a bidirectional channel to
/// a named counterparty. Reference implementation in `accord-node`.
pub trait SessionTransport: Send + Sync {
    fn open_session(&self, local: &Party, counterparty: &Party) -> Result<Session, FlowError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_types::{PartyName, PublicKey};

    fn party(name: &str, key_byte: u8) -> Party {
        Party::new(PartyName::new(name), PublicKey([key_byte; 32]))
    }

    #[tokio::test]
    async fn pair_is_cross_connected() {
        let (a_end, mut b_end) = Session::pair(party("PartyA", 1), party("PartyB", 2));
        assert_eq!(a_end.counterparty.name.as_str(), "PartyB");
        assert_eq!(b_end.counterparty.name.as_str(), "PartyA");

        a_end
            .send(FlowMessage::Aborted {
                reason: "test".into(),
            })
            .await
            .unwrap();
        assert!(matches!(
            b_end.recv().await,
            Some(FlowMessage::Aborted { .. })
        ));
    }

    #[tokio::test]
    async fn send_after_peer_drop_is_transport_error() {
        let (a_end, b_end) = Session::pair(party("PartyA", 1), party("PartyB", 2));
        drop(b_end);
        let result = a_end
            .send(FlowMessage::Aborted {
                reason: "test".into(),
            })
            .await;
        assert!(matches!(result, Err(FlowError::Transport(_))));
    }
}
