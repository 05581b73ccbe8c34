/// Matchmaking configuration constants.
/// 
/// This module defines parameters for match sessions, such as capacity,
/// join retries, and the notice sent when a match begins.
pub const MATCH_CAPACITY: usize = 2; // Players needed to start a match.

/// Attempts made to join a live session when a concurrent prune retires it.
pub const JOIN_ATTEMPTS: usize = 2;

/// Text sent to each player once both players are present.
pub const MATCH_STARTED_NOTICE: &str = "Match Started";

/// Close reason sent to a player once the relay round is over.
pub const MATCH_OVER_REASON: &str = "Match over";
