pub mod types;
pub mod messages;
pub mod store;
pub mod endpoint;

pub use store::{InMemoryMatchStore, MatchStore};
