//! Live match session.
//!
//! Holds the (at most two) participants of one match, the `ready` and `over`
//! one-shot signals, and runs the single relay round between the two players.
//!
//! Phases only move forward: `Waiting -> Ready -> Relaying -> Over`.

use std::sync::{Arc, Mutex, MutexGuard};
use log::{debug, info, warn};
use tokio::task::JoinHandle;

use super::participant::Participant;
use super::signal::Signal;
use crate::config::matchmaking::MATCH_CAPACITY;
use crate::server::error::MatchError;
use crate::server::matchmaking::types::MatchId;

type SharedParticipant = Arc<dyn Participant>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Zero or one participant.
    Waiting,
    /// Two participants, relay not yet running.
    Ready,
    Relaying,
    Over,
}

/// Result of a successful [`MatchSession::join`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Joined {
    /// First participant; waiting for a peer.
    Waiting,
    /// This join completed the pair and fired `ready`. The caller owns spawning the relay.
    Paired,
}

/// Relay roles, fixed at the moment of pairing (join order).
#[derive(Clone)]
struct Roles {
    blue: SharedParticipant,
    red: SharedParticipant,
}

struct SessionState {
    participants: Vec<SharedParticipant>,
    phase: SessionPhase,
    roles: Option<Roles>,
    /// Set by the registry when the session is pruned; further joins must go to a fresh session.
    retired: bool,
}

pub struct MatchSession {
    match_id: MatchId,
    state: Mutex<SessionState>,
    ready: Signal,
    over: Signal,
}

impl MatchSession {
    pub fn new(match_id: MatchId) -> Self {
        Self {
            match_id,
            state: Mutex::new(SessionState {
                participants: Vec::with_capacity(MATCH_CAPACITY),
                phase: SessionPhase::Waiting,
                roles: None,
                retired: false,
            }),
            ready: Signal::new(),
            over: Signal::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    pub fn is_started(&self) -> bool {
        self.phase() != SessionPhase::Waiting
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().participants.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a participant.
    ///
    /// Fails with `Full` when two participants are present or the match has started,
    /// and with `Retired` when the registry has already pruned this session.
    /// The join that brings the count to two fires `ready` and is the only one
    /// that returns [`Joined::Paired`].
    pub fn join(&self, participant: SharedParticipant) -> Result<Joined, MatchError> {
        let mut state = self.lock();
        if state.retired {
            return Err(MatchError::Retired);
        }
        if state.phase != SessionPhase::Waiting || state.participants.len() >= MATCH_CAPACITY {
            debug!(
                "[MatchSession] Rejected join of {} to full match {}",
                participant.connection_id(),
                self.match_id
            );
            return Err(MatchError::Full);
        }

        state.participants.push(participant);
        if state.participants.len() < MATCH_CAPACITY {
            return Ok(Joined::Waiting);
        }

        state.roles = Some(Roles {
            blue: state.participants[0].clone(),
            red: state.participants[1].clone(),
        });
        state.phase = SessionPhase::Ready;
        self.ready.fire();
        info!("[MatchSession] Match {} is ready", self.match_id);
        Ok(Joined::Paired)
    }

    /// Remove a participant by connection id. Removing an absent participant is a no-op.
    pub fn leave(&self, connection_id: uuid::Uuid) -> bool {
        let mut state = self.lock();
        let before = state.participants.len();
        state.participants.retain(|p| p.connection_id() != connection_id);
        before != state.participants.len()
    }

    /// Mark the session retired if it has no participants. Called by the registry only.
    pub(crate) fn retire_if_empty(&self) -> bool {
        let mut state = self.lock();
        if state.participants.is_empty() {
            state.retired = true;
        }
        state.retired
    }

    pub async fn wait_ready(&self) {
        self.ready.wait().await
    }

    pub async fn wait_over(&self) {
        self.over.wait().await
    }

    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        self.ready.is_fired()
    }

    #[cfg(test)]
    pub fn is_over(&self) -> bool {
        self.over.is_fired()
    }

    /// Run the relay on its own task, detached from any connection handler.
    pub fn spawn_relay(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            match session.relay().await {
                Ok(()) => info!("[MatchSession] Relay completed for match {}", session.match_id),
                Err(MatchError::Disconnected) => {
                    info!("[MatchSession] Relay aborted for match {}: peer disconnected", session.match_id)
                }
                Err(e) => warn!("[MatchSession] Relay aborted for match {}: {}", session.match_id, e),
            }
        })
    }

    /// Exchange one message each way between the two players, then fire `over`.
    ///
    /// Both reads are outstanding at the same time; deliveries start only after
    /// both reads completed. Any read or send failure aborts the round, but `over`
    /// still fires.
    pub async fn relay(&self) -> Result<(), MatchError> {
        let roles = self.begin_relay()?;
        let outcome = exchange(&roles).await;
        self.finish();
        outcome
    }

    fn begin_relay(&self) -> Result<Roles, MatchError> {
        let mut state = self.lock();
        match (state.phase, state.roles.clone()) {
            (SessionPhase::Ready, Some(roles)) => {
                state.phase = SessionPhase::Relaying;
                Ok(roles)
            }
            (phase, _) => Err(MatchError::InternalRace(format!(
                "relay started in phase {:?} for match {}",
                phase, self.match_id
            ))),
        }
    }

    /// End a session whose relay can no longer run (its pairing handler never got accepted).
    /// No-op unless the session reached `Ready`.
    pub fn abort(&self) {
        {
            let mut state = self.lock();
            if state.phase != SessionPhase::Ready {
                return;
            }
            state.phase = SessionPhase::Over;
        }
        warn!("[MatchSession] Match {} aborted before relay", self.match_id);
        self.over.fire();
    }

    fn finish(&self) {
        self.lock().phase = SessionPhase::Over;
        self.over.fire();
    }
}

async fn exchange(roles: &Roles) -> Result<(), MatchError> {
    let (blue_text, red_text) =
        tokio::try_join!(roles.blue.receive_text(), roles.red.receive_text())?;
    tokio::try_join!(roles.blue.send_text(red_text), roles.red.send_text(blue_text))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::match_session::testing::mock_participant;
    use std::time::Duration;
    use tokio::time::timeout;
    use uuid::Uuid;

    const WAIT: Duration = Duration::from_secs(2);

    #[test]
    fn test_third_join_is_full() {
        let session = MatchSession::new(Uuid::new_v4());
        let (a, _ca) = mock_participant();
        let (b, _cb) = mock_participant();
        let (c, _cc) = mock_participant();

        assert_eq!(session.join(a), Ok(Joined::Waiting));
        assert!(!session.is_ready());
        assert_eq!(session.join(b), Ok(Joined::Paired));
        assert!(session.is_ready());
        assert_eq!(session.join(c), Err(MatchError::Full));
        assert_eq!(session.len(), 2);
        assert_eq!(session.phase(), SessionPhase::Ready);
    }

    #[test]
    fn test_started_session_rejects_joins_after_leave() {
        let session = MatchSession::new(Uuid::new_v4());
        let (a, _ca) = mock_participant();
        let (b, _cb) = mock_participant();
        let (c, _cc) = mock_participant();
        let b_id = b.connection_id();

        session.join(a).unwrap();
        session.join(b).unwrap();
        assert!(session.leave(b_id));
        assert!(!session.leave(b_id));
        assert_eq!(session.join(c), Err(MatchError::Full));
        assert!(session.is_started());
    }

    #[test]
    fn test_retired_session_rejects_join() {
        let session = MatchSession::new(Uuid::new_v4());
        assert!(session.retire_if_empty());
        let (a, _ca) = mock_participant();
        assert_eq!(session.join(a), Err(MatchError::Retired));
    }

    #[tokio::test]
    async fn test_ready_releases_every_waiter() {
        let session = Arc::new(MatchSession::new(Uuid::new_v4()));
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let session = session.clone();
                tokio::spawn(async move { session.wait_ready().await })
            })
            .collect();

        let (a, _ca) = mock_participant();
        let (b, _cb) = mock_participant();
        session.join(a).unwrap();
        tokio::task::yield_now().await;
        assert!(!session.is_ready());
        session.join(b).unwrap();

        for waiter in waiters {
            timeout(WAIT, waiter).await.expect("ready waiter blocked").unwrap();
        }
        // A waiter arriving late is released immediately.
        timeout(WAIT, session.wait_ready()).await.unwrap();
    }

    #[tokio::test]
    async fn test_relay_swaps_messages() {
        let session = Arc::new(MatchSession::new(Uuid::new_v4()));
        let (a, mut ca) = mock_participant();
        let (b, mut cb) = mock_participant();
        session.join(a).unwrap();
        session.join(b).unwrap();

        let relay = session.spawn_relay();
        // Red speaks first; order must not matter.
        cb.say("paper");
        ca.say("rock");

        timeout(WAIT, relay).await.unwrap().unwrap();
        assert!(session.is_over());
        assert_eq!(session.phase(), SessionPhase::Over);
        assert_eq!(ca.next_message().await.as_deref(), Some("paper"));
        assert_eq!(cb.next_message().await.as_deref(), Some("rock"));
    }

    #[tokio::test]
    async fn test_relay_abort_still_fires_over() {
        let session = Arc::new(MatchSession::new(Uuid::new_v4()));
        let (a, mut ca) = mock_participant();
        let (b, mut cb) = mock_participant();
        session.join(a).unwrap();
        session.join(b).unwrap();

        let relay = {
            let session = session.clone();
            tokio::spawn(async move { session.relay().await })
        };
        ca.say("rock");
        cb.disconnect();

        let outcome = timeout(WAIT, relay).await.unwrap().unwrap();
        assert_eq!(outcome, Err(MatchError::Disconnected));
        timeout(WAIT, session.wait_over()).await.unwrap();
        assert!(ca.try_next_message().is_none());
    }

    #[tokio::test]
    async fn test_relay_aborts_when_red_leaves_while_blue_is_silent() {
        let session = Arc::new(MatchSession::new(Uuid::new_v4()));
        let (a, mut ca) = mock_participant();
        let (b, mut cb) = mock_participant();
        session.join(a).unwrap();
        session.join(b).unwrap();

        let relay = {
            let session = session.clone();
            tokio::spawn(async move { session.relay().await })
        };
        // Blue never speaks: only a read on red that is already in flight can end the round.
        cb.disconnect();

        let outcome = timeout(Duration::from_millis(500), relay)
            .await
            .expect("relay still waiting on blue")
            .unwrap();
        assert_eq!(outcome, Err(MatchError::Disconnected));
        assert!(session.is_over());
        assert!(ca.try_next_message().is_none());
    }

    #[tokio::test]
    async fn test_relay_requires_ready_session() {
        let session = Arc::new(MatchSession::new(Uuid::new_v4()));
        let (a, _ca) = mock_participant();
        assert!(matches!(session.relay().await, Err(MatchError::InternalRace(_))));
        session.join(a).unwrap();
        assert!(!session.is_over());
    }

    #[tokio::test]
    async fn test_abort_only_applies_to_ready_sessions() {
        let session = MatchSession::new(Uuid::new_v4());
        session.abort();
        assert!(!session.is_over());

        let (a, _ca) = mock_participant();
        let (b, _cb) = mock_participant();
        session.join(a).unwrap();
        session.join(b).unwrap();
        session.abort();
        assert!(session.is_over());
        assert_eq!(session.phase(), SessionPhase::Over);
        assert!(matches!(session.relay().await, Err(MatchError::InternalRace(_))));
    }
}
