/// Main configuration module.
/// 
/// Re-exports submodules for matchmaking and server configuration.
pub mod matchmaking;
pub mod server;
