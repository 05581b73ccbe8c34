use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// Authenticated player identity, supplied by the identity layer and trusted as-is.
pub type PlayerId = String;

/// Identifier of a persisted match, assigned by the allocator.
pub type MatchId = Uuid;

/// Persisted status of a match.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Waiting,
    Ready,
    Finished,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct MatchRecord {
    pub id: MatchId,
    pub status: MatchStatus,
    /// Monotonic creation order, used to hand out the oldest open match first.
    #[serde(skip)]
    pub seq: u64,
}
