//! Configuration management for lexrelayd.
//!
//! Loads settings from /etc/lexrelay/config.toml, then ./lexrelay.toml,
//! then defaults. The upstream API key can additionally come from the
//! environment, which wins over the file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/lexrelay/config.toml";

/// Fallback config file path (working directory)
pub const LOCAL_CONFIG_PATH: &str = "lexrelay.toml";

/// Environment variable carrying the upstream API key
pub const API_KEY_ENV: &str = "LEXRELAY_API_KEY";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS origin allow-list
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Fixed-window per-IP rate limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds
    #[serde(default = "default_rate_window")]
    pub window_secs: u64,

    /// Maximum requests per window per client IP
    #[serde(default = "default_rate_max")]
    pub max_requests: usize,
}

fn default_rate_window() -> u64 {
    60
}

fn default_rate_max() -> usize {
    20
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_rate_window(),
            max_requests: default_rate_max(),
        }
    }
}

/// Upstream completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Completion endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key. Usually supplied via the environment instead.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        .to_string()
}

fn default_upstream_timeout() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_upstream_timeout(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Load config from file or defaults, then apply the env API key.
    pub fn load() -> Self {
        let mut config = Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(LOCAL_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            });

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.upstream.api_key = Some(key.trim().to_string());
            }
        }

        config
    }

    /// Load config from specific path
    fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.rate_limit.window_secs, 60);
        assert_eq!(config.server.rate_limit.max_requests, 20);
        assert!(config.upstream.api_key.is_none());
        assert_eq!(config.upstream.timeout_secs, 30);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
port = 8080
allowed_origins = ["https://app.example.com"]

[server.rate_limit]
max_requests = 5

[upstream]
endpoint = "https://api.example.com/complete"
timeout_secs = 10
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.allowed_origins, vec!["https://app.example.com"]);
        assert_eq!(config.server.rate_limit.max_requests, 5);
        // Defaults for missing fields
        assert_eq!(config.server.rate_limit.window_secs, 60);
        assert_eq!(config.upstream.endpoint, "https://api.example.com/complete");
        assert_eq!(config.upstream.timeout_secs, 10);
    }

    #[test]
    fn test_empty_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.timeout_secs, 30);
    }
}
