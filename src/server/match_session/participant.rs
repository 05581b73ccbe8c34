//! Capability set of one connected player, independent of the transport.

use async_trait::async_trait;
use uuid::Uuid;

use crate::server::error::MatchError;

/// One live connection as seen by a match session.
///
/// Owned by the connection handler that accepted it; sessions and the relay task
/// only hold shared references and identify it by [`Participant::connection_id`].
#[async_trait]
pub trait Participant: Send + Sync {
    fn connection_id(&self) -> Uuid;

    async fn send_text(&self, text: String) -> Result<(), MatchError>;

    /// Receive the next text message. Fails with `Disconnected` once the transport is gone.
    async fn receive_text(&self) -> Result<String, MatchError>;

    /// Close the connection from the server side.
    async fn close(&self, reason: Option<String>) -> Result<(), MatchError>;

    /// Resolves once the transport has closed, whichever side closed it.
    async fn closed(&self);

    fn is_open(&self) -> bool;
}
