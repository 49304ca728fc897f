//! Runtime configuration from the environment

use std::net::SocketAddr;
use std::time::Duration;

use chess_stats_core::api::{DEFAULT_API_BASE, DEFAULT_TIMEOUT};

const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the backend REST API
    pub api_url: String,
    pub bind_addr: SocketAddr,
    pub timeout: Duration,
    /// Ask the backend for player statistics instead of aggregating locally
    pub server_aggregation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_BASE.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            timeout: DEFAULT_TIMEOUT,
            server_aggregation: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("CHESS_STATS_API_URL").filter(|u| !u.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }

        if let Some(bind) = lookup("CHESS_STATS_BIND") {
            match bind.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!(
                    "Invalid CHESS_STATS_BIND '{}' ({}), using {}",
                    bind,
                    e,
                    DEFAULT_BIND
                ),
            }
        }

        if let Some(secs) = lookup("CHESS_STATS_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    "Invalid CHESS_STATS_TIMEOUT_SECS '{}', using {}s",
                    secs,
                    DEFAULT_TIMEOUT.as_secs()
                ),
            }
        }

        if let Some(flag) = lookup("CHESS_STATS_SERVER_AGGREGATION") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.server_aggregation = true,
                "0" | "false" | "no" | "" => config.server_aggregation = false,
                other => tracing::warn!("Invalid CHESS_STATS_SERVER_AGGREGATION '{}'", other),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CHESS_STATS_API_URL", "https://stats.example.org/api"),
            ("CHESS_STATS_BIND", "0.0.0.0:8080"),
            ("CHESS_STATS_TIMEOUT_SECS", "5"),
            ("CHESS_STATS_SERVER_AGGREGATION", "true"),
        ]);

        assert_eq!(config.api_url, "https://stats.example.org/api");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.server_aggregation);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("CHESS_STATS_BIND", "not an address"),
            ("CHESS_STATS_TIMEOUT_SECS", "0"),
            ("CHESS_STATS_SERVER_AGGREGATION", "maybe"),
        ]);

        assert_eq!(config, Config::default());
    }
}
