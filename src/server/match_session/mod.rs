//! Live match coordination: sessions, their registry, and the per-connection protocol.

pub mod signal;
pub mod participant;
pub mod session;
pub mod registry;
pub mod handler;
pub mod socket;

#[cfg(test)]
pub mod testing;

pub use registry::SessionRegistry;
pub use session::MatchSession;
