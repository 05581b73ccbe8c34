//! Registry of live match sessions, keyed by match id.
//!
//! Created once at startup and shared by every connection handler.
//! Lock order is registry, then session; neither lock is held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use log::debug;

use super::session::MatchSession;
use crate::server::matchmaking::types::MatchId;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<MatchId, Arc<MatchSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MatchId, Arc<MatchSession>>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the live session for `match_id`, creating an empty one if absent.
    pub fn get_or_create(&self, match_id: MatchId) -> Arc<MatchSession> {
        self.lock()
            .entry(match_id)
            .or_insert_with(|| {
                debug!("[Registry] Created session for match {}", match_id);
                Arc::new(MatchSession::new(match_id))
            })
            .clone()
    }

    #[cfg(test)]
    pub fn get(&self, match_id: &MatchId) -> Option<Arc<MatchSession>> {
        self.lock().get(match_id).cloned()
    }

    #[cfg(test)]
    pub fn contains(&self, match_id: &MatchId) -> bool {
        self.lock().contains_key(match_id)
    }

    /// Remove the entry if present.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn remove(&self, match_id: &MatchId) {
        if self.lock().remove(match_id).is_some() {
            debug!("[Registry] Removed session for match {}", match_id);
        }
    }

    /// Remove the session if it has no participants left.
    ///
    /// The session is retired under both locks, so a concurrent join either lands
    /// before the check (and keeps the session alive) or fails with `Retired`.
    pub fn prune_if_empty(&self, match_id: &MatchId) -> bool {
        let mut sessions = self.lock();
        let retired = sessions
            .get(match_id)
            .is_some_and(|session| session.retire_if_empty());
        if retired {
            sessions.remove(match_id);
            debug!("[Registry] Pruned empty session for match {}", match_id);
        }
        retired
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
