// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the session registry and the match store. Both are created once at startup
//! and shared by every HTTP/WebSocket handler.

use std::sync::Arc;

use crate::server::match_session::SessionRegistry;
use crate::server::matchmaking::{InMemoryMatchStore, MatchStore};

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Live match sessions, keyed by match id.
    pub registry: Arc<SessionRegistry>,
    /// Persisted matches and player assignments.
    pub store: Arc<dyn MatchStore>,
}

impl AppState {
    /// Create a new AppState with the given registry and store.
    pub fn new(registry: Arc<SessionRegistry>, store: Arc<dyn MatchStore>) -> Self {
        AppState { registry, store }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(InMemoryMatchStore::new()),
        )
    }
}
