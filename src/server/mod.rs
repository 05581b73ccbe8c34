// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Matchmaking allocation and the match store
//! - Live match sessions (pairing, relay, cleanup)

pub mod state;
pub mod router;
pub mod error;
pub mod identity;
pub mod matchmaking;
pub mod match_session;
pub mod ws_error;
