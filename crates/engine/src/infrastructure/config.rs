//! Application configuration

use std::env;
use std::net::IpAddr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection URL
    pub database_url: String,

    /// Address the HTTP server binds to
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,

    /// Client addresses allowed to reach the API (empty allows everyone)
    pub ip_whitelist: Vec<IpAddr>,

    /// CORS allowed origins (comma-separated, or "*" for any; empty disables CORS)
    pub cors_allowed_origins: Vec<String>,

    /// Emit a log line per request
    pub log_requests: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: var("DATABASE_URL", "sqlite:cityroute.db?mode=rwc"),

            server_host: var("SERVER_HOST", "0.0.0.0"),
            server_port: var("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            ip_whitelist: var("IP_WHITELIST", "")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<IpAddr>()
                        .with_context(|| format!("IP_WHITELIST entry '{s}' is not an IP address"))
                })
                .collect::<Result<_>>()?,

            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            log_requests: parse_flag(&var("LOG_REQUESTS", "true")),
        })
    }

    /// `host:port` string for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).expect("defaults");

        assert_eq!(config.database_url, "sqlite:cityroute.db?mode=rwc");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.ip_whitelist.is_empty());
        assert_eq!(config.cors_allowed_origins, vec!["*"]);
        assert!(config.log_requests);
    }

    #[test]
    fn whitelist_is_comma_separated() {
        let config = config_from(&[("IP_WHITELIST", "127.0.0.1, ::1,,10.0.0.7")])
            .expect("whitelist");

        let expected: Vec<IpAddr> = ["127.0.0.1", "::1", "10.0.0.7"]
            .iter()
            .map(|s| s.parse().expect("ip"))
            .collect();
        assert_eq!(config.ip_whitelist, expected);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_from(&[("SERVER_PORT", "eighty")]).is_err());
        assert!(config_from(&[("IP_WHITELIST", "localhost")]).is_err());
    }

    #[test]
    fn log_requests_can_be_switched_off() {
        let config = config_from(&[("LOG_REQUESTS", "False")]).expect("config");
        assert!(!config.log_requests);
    }
}
