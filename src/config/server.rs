//! Server configuration.
//!
//! Defaults can be overridden with `MATCH_RELAY_HOST` and `MATCH_RELAY_PORT`.
use log::warn;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("MATCH_RELAY_HOST").ok(),
            std::env::var("MATCH_RELAY_PORT").ok(),
        )
    }

    fn from_vars(host: Option<String>, port: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            config.host = host;
        }
        if let Some(raw) = port {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warn!("[Config] Ignoring invalid MATCH_RELAY_PORT={}", raw),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(ServerConfig::from_vars(None, None), ServerConfig::default());
    }

    #[test]
    fn test_overrides_and_bad_port() {
        let config = ServerConfig::from_vars(Some("0.0.0.0".into()), Some("9001".into()));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9001);

        let config = ServerConfig::from_vars(Some("  ".into()), Some("not-a-port".into()));
        assert_eq!(config, ServerConfig::default());
    }
}
