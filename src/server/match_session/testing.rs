//! In-memory participants for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::participant::Participant;
use super::signal::Signal;
use crate::server::error::MatchError;

pub struct MockParticipant {
    id: Uuid,
    inbox: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
    outbox: mpsc::UnboundedSender<String>,
    closed: Signal,
    closed_by_server: AtomicBool,
    close_reason: Mutex<Option<String>>,
}

/// The remote end of a [`MockParticipant`].
pub struct MockClient {
    participant: Arc<MockParticipant>,
    to_server: Option<mpsc::UnboundedSender<String>>,
    from_server: mpsc::UnboundedReceiver<String>,
}

pub fn mock_participant() -> (Arc<dyn Participant>, MockClient) {
    let (to_server, inbox) = mpsc::unbounded_channel();
    let (outbox, from_server) = mpsc::unbounded_channel();
    let participant = Arc::new(MockParticipant {
        id: Uuid::new_v4(),
        inbox: tokio::sync::Mutex::new(inbox),
        outbox,
        closed: Signal::new(),
        closed_by_server: AtomicBool::new(false),
        close_reason: Mutex::new(None),
    });
    let client = MockClient {
        participant: participant.clone(),
        to_server: Some(to_server),
        from_server,
    };
    (participant, client)
}

impl MockClient {
    pub fn say(&self, text: &str) {
        if let Some(tx) = &self.to_server {
            let _ = tx.send(text.to_string());
        }
    }

    /// Drop the connection from the client side.
    pub fn disconnect(&mut self) {
        self.to_server = None;
        self.participant.closed.fire();
    }

    pub async fn next_message(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(2), self.from_server.recv())
            .await
            .ok()
            .flatten()
    }

    pub fn try_next_message(&mut self) -> Option<String> {
        self.from_server.try_recv().ok()
    }

    pub fn closed_by_server(&self) -> bool {
        self.participant.closed_by_server.load(Ordering::SeqCst)
    }

    pub fn close_reason(&self) -> Option<String> {
        self.participant.close_reason.lock().unwrap().clone()
    }
}

#[async_trait]
impl Participant for MockParticipant {
    fn connection_id(&self) -> Uuid {
        self.id
    }

    async fn send_text(&self, text: String) -> Result<(), MatchError> {
        if !self.is_open() {
            return Err(MatchError::Disconnected);
        }
        self.outbox.send(text).map_err(|_| MatchError::Disconnected)
    }

    async fn receive_text(&self) -> Result<String, MatchError> {
        self.inbox.lock().await.recv().await.ok_or(MatchError::Disconnected)
    }

    async fn close(&self, reason: Option<String>) -> Result<(), MatchError> {
        if !self.closed.fire() {
            return Err(MatchError::Disconnected);
        }
        self.closed_by_server.store(true, Ordering::SeqCst);
        *self.close_reason.lock().unwrap() = reason;
        Ok(())
    }

    async fn closed(&self) {
        self.closed.wait().await
    }

    fn is_open(&self) -> bool {
        !self.closed.is_fired()
    }
}
