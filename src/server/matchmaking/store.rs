//! Match store.
//!
//! Persistence boundary for matches and player assignments. The allocator hands out
//! match ids from here and the connection handler checks existence, records
//! assignments, and updates status through it.
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use log::{debug, info};
use uuid::Uuid;

use super::types::{MatchId, MatchRecord, MatchStatus, PlayerId};
use crate::config::matchmaking::MATCH_CAPACITY;
use crate::server::error::MatchError;

pub trait MatchStore: Send + Sync {
    /// Find an open match with a free slot for `player`, or create one.
    fn allocate(&self, player: &PlayerId) -> Result<MatchId, MatchError>;

    fn contains(&self, match_id: &MatchId) -> bool;

    #[cfg(test)]
    fn get(&self, match_id: &MatchId) -> Option<MatchRecord>;

    /// Record that `player` has joined the live session of `match_id`.
    fn assign_player(&self, match_id: &MatchId, player: &PlayerId);

    /// Clear the assignment of `player`, only if it still points to `match_id`.
    fn release_player(&self, match_id: &MatchId, player: &PlayerId);

    fn set_status(&self, match_id: &MatchId, status: MatchStatus);

    #[cfg(test)]
    fn assigned_players(&self, match_id: &MatchId) -> usize;

    #[cfg(test)]
    fn current_match(&self, player: &PlayerId) -> Option<MatchId>;
}

#[derive(Default)]
struct StoreInner {
    matches: HashMap<MatchId, MatchRecord>,
    /// Player -> match they are currently in.
    current: HashMap<PlayerId, MatchId>,
    next_seq: u64,
}

impl StoreInner {
    fn assigned(&self, match_id: &MatchId) -> usize {
        self.current.values().filter(|id| *id == match_id).count()
    }
}

/// In-memory match store, shared by every request handler.
#[derive(Default)]
pub struct InMemoryMatchStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MatchStore for InMemoryMatchStore {
    fn allocate(&self, player: &PlayerId) -> Result<MatchId, MatchError> {
        let mut inner = self.lock();
        if inner.current.contains_key(player) {
            return Err(MatchError::AlreadyInMatch(player.clone()));
        }

        let open = inner
            .matches
            .values()
            .filter(|m| m.status == MatchStatus::Waiting)
            .filter(|m| inner.assigned(&m.id) < MATCH_CAPACITY)
            .min_by_key(|m| m.seq)
            .map(|m| m.id);

        if let Some(match_id) = open {
            debug!("[Matchmaking] Player {} allocated to open match {}", player, match_id);
            return Ok(match_id);
        }

        let match_id = Uuid::new_v4();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.matches.insert(match_id, MatchRecord {
            id: match_id,
            status: MatchStatus::Waiting,
            seq,
        });
        info!("[Matchmaking] Created match {} for player {}", match_id, player);
        Ok(match_id)
    }

    fn contains(&self, match_id: &MatchId) -> bool {
        self.lock().matches.contains_key(match_id)
    }

    #[cfg(test)]
    fn get(&self, match_id: &MatchId) -> Option<MatchRecord> {
        self.lock().matches.get(match_id).cloned()
    }

    fn assign_player(&self, match_id: &MatchId, player: &PlayerId) {
        self.lock().current.insert(player.clone(), *match_id);
    }

    fn release_player(&self, match_id: &MatchId, player: &PlayerId) {
        let mut inner = self.lock();
        if inner.current.get(player) == Some(match_id) {
            inner.current.remove(player);
        }
    }

    fn set_status(&self, match_id: &MatchId, status: MatchStatus) {
        if let Some(record) = self.lock().matches.get_mut(match_id) {
            if record.status != status {
                debug!("[Matchmaking] Match {} {:?} -> {:?}", match_id, record.status, status);
                record.status = status;
            }
        }
    }

    #[cfg(test)]
    fn assigned_players(&self, match_id: &MatchId) -> usize {
        self.lock().assigned(match_id)
    }

    #[cfg(test)]
    fn current_match(&self, player: &PlayerId) -> Option<MatchId> {
        self.lock().current.get(player).copied()
    }
}
