//! Domain errors shared by the matchmaking and match session layers.

use thiserror::Error;

use crate::server::matchmaking::types::PlayerId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The match id is unknown to the match store.
    #[error("Match not found")]
    NotFound,

    /// The session already holds two players or has started.
    #[error("Too many players in match")]
    Full,

    /// The peer transport closed during a wait, read, or send.
    #[error("Participant disconnected")]
    Disconnected,

    /// The session was pruned from the registry between lookup and join.
    /// Handled by retrying the lookup; never surfaced to clients.
    #[error("Match session was retired")]
    Retired,

    /// Registry single-creation was violated or the relay ran in a bad phase.
    #[error("Internal match race: {0}")]
    InternalRace(String),

    #[error("Player {0} is already in a match")]
    AlreadyInMatch(PlayerId),
}

impl MatchError {
    /// Stable machine-readable code used in error bodies and close reasons.
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::NotFound => "MATCH_NOT_FOUND",
            MatchError::Full => "MATCH_FULL",
            MatchError::Disconnected => "DISCONNECTED",
            MatchError::Retired | MatchError::InternalRace(_) => "INTERNAL_RACE",
            MatchError::AlreadyInMatch(_) => "ALREADY_IN_MATCH",
        }
    }
}
