//! Per-connection protocol driver.
//!
//! [`ConnectionHandler::admit`] resolves the match and joins its live session before
//! the transport is accepted. The returned [`AdmittedConnection`] is then either run
//! to completion or abandoned; both consume it, so cleanup happens exactly once.

use std::future::Future;
use std::sync::Arc;
use log::{debug, error, info, warn};
use uuid::Uuid;

use super::participant::Participant;
use super::registry::SessionRegistry;
use super::session::{Joined, MatchSession};
use crate::config::matchmaking::{JOIN_ATTEMPTS, MATCH_OVER_REASON, MATCH_STARTED_NOTICE};
use crate::server::error::MatchError;
use crate::server::matchmaking::store::MatchStore;
use crate::server::matchmaking::types::{MatchId, MatchStatus, PlayerId};

pub struct ConnectionHandler {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn MatchStore>,
    player_id: PlayerId,
    participant: Arc<dyn Participant>,
}

/// A connection that has joined a live session and must be run or abandoned.
pub struct AdmittedConnection {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn MatchStore>,
    player_id: PlayerId,
    participant: Arc<dyn Participant>,
    session: Arc<MatchSession>,
    joined: Joined,
}

impl ConnectionHandler {
    pub fn new(
        registry: Arc<SessionRegistry>,
        store: Arc<dyn MatchStore>,
        player_id: PlayerId,
        participant: Arc<dyn Participant>,
    ) -> Self {
        Self {
            registry,
            store,
            player_id,
            participant,
        }
    }

    /// Resolve `raw_match_id` and join its live session.
    ///
    /// Fails with `NotFound` for ids unknown to the store, `Full` when the session
    /// already has its players, and `InternalRace` if the session keeps being pruned
    /// under us. A rejected connection leaves no trace in the session.
    pub fn admit(self, raw_match_id: &str) -> Result<AdmittedConnection, MatchError> {
        let match_id = Uuid::parse_str(raw_match_id).map_err(|_| MatchError::NotFound)?;
        if !self.store.contains(&match_id) {
            warn!("[MatchSession] Player {} asked for unknown match {}", self.player_id, match_id);
            return Err(MatchError::NotFound);
        }

        for attempt in 1..=JOIN_ATTEMPTS {
            let session = self.registry.get_or_create(match_id);
            match session.join(self.participant.clone()) {
                Ok(joined) => {
                    self.store.assign_player(&match_id, &self.player_id);
                    if joined == Joined::Paired {
                        self.store.set_status(&match_id, MatchStatus::Ready);
                    }
                    info!(
                        "[MatchSession] Player {} joined match {} ({:?})",
                        self.player_id, match_id, joined
                    );
                    return Ok(AdmittedConnection {
                        registry: self.registry,
                        store: self.store,
                        player_id: self.player_id,
                        participant: self.participant,
                        session,
                        joined,
                    });
                }
                Err(MatchError::Retired) => {
                    debug!(
                        "[MatchSession] Session for match {} retired during join (attempt {})",
                        match_id, attempt
                    );
                }
                Err(e) => {
                    warn!("[MatchSession] Player {} rejected from match {}: {}", self.player_id, match_id, e);
                    return Err(e);
                }
            }
        }

        self.registry.prune_if_empty(&match_id);
        error!("[MatchSession] Could not join match {} after {} attempts", match_id, JOIN_ATTEMPTS);
        Err(MatchError::InternalRace(format!(
            "session for match {match_id} was retired on every join attempt"
        )))
    }
}

impl AdmittedConnection {
    pub fn match_id(&self) -> MatchId {
        self.session.match_id()
    }

    #[cfg(test)]
    pub fn joined(&self) -> Joined {
        self.joined
    }

    #[cfg(test)]
    pub fn session(&self) -> &Arc<MatchSession> {
        &self.session
    }

    /// Drive the accepted connection until the match is over or the player disconnects.
    ///
    /// `Ok` means `over` was observed, including when the relay aborted because the
    /// peer left.
    pub async fn run(self) -> Result<(), MatchError> {
        if self.joined == Joined::Paired {
            self.session.spawn_relay();
        }

        let outcome = self.drive().await;
        match &outcome {
            Ok(()) => info!("[MatchSession] Player {} finished match {}", self.player_id, self.match_id()),
            Err(MatchError::Disconnected) => {
                debug!("[MatchSession] Player {} disconnected from match {}", self.player_id, self.match_id())
            }
            Err(e) => warn!("[MatchSession] Player {} left match {}: {}", self.player_id, self.match_id(), e),
        }

        self.cleanup().await;
        outcome
    }

    /// Give up on a connection whose transport could not be accepted.
    pub async fn abandon(self) {
        if self.joined == Joined::Paired {
            // The relay was never spawned; release the peer.
            self.session.abort();
        }
        self.cleanup().await;
    }

    async fn drive(&self) -> Result<(), MatchError> {
        self.unless_disconnected(self.session.wait_ready()).await?;
        self.participant.send_text(MATCH_STARTED_NOTICE.to_string()).await?;
        self.unless_disconnected(self.session.wait_over()).await
    }

    /// Wait for `signal`, bailing out if this participant's own transport closes first.
    async fn unless_disconnected(&self, signal: impl Future<Output = ()>) -> Result<(), MatchError> {
        tokio::select! {
            biased;
            _ = self.participant.closed() => Err(MatchError::Disconnected),
            _ = signal => Ok(()),
        }
    }

    async fn cleanup(self) {
        let match_id = self.match_id();
        if self.participant.is_open() {
            if let Err(e) = self.participant.close(Some(MATCH_OVER_REASON.to_string())).await {
                debug!("[MatchSession] Close for player {} failed: {}", self.player_id, e);
            }
        }

        self.session.leave(self.participant.connection_id());
        self.registry.prune_if_empty(&match_id);

        if self.session.is_started() {
            self.store.set_status(&match_id, MatchStatus::Finished);
        }
        self.store.release_player(&match_id, &self.player_id);
    }
}
