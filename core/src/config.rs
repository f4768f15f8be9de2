//! Client configuration
//!
//! Loads settings from environment variables, optionally seeded from a
//! `.env` file.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://discord.com/api/v8";
pub const DEFAULT_USER_AGENT: &str = "Chrome/86.0.4240.75";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-GB";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Everything a `Session` needs to talk to the platform.
#[derive(Clone)]
pub struct ClientConfig {
    pub token: String,
    pub base_url: String,
    pub user_agent: String,
    pub accept_language: String,
    /// Applied to the whole request, connect through body read.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Load configuration from environment variables
    ///
    /// Reads `DISCORD_TOKEN` (required), `DISCORD_API_BASE`,
    /// `DISCORD_USER_AGENT`, `DISCORD_ACCEPT_LANGUAGE` and
    /// `DISCORD_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. `from_env` delegates here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?;

        let mut config = Self::new(&token);
        if let Some(base_url) = lookup("DISCORD_API_BASE") {
            config.base_url = base_url;
        }
        if let Some(user_agent) = lookup("DISCORD_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(lang) = lookup("DISCORD_ACCEPT_LANGUAGE") {
            config.accept_language = lang;
        }
        if let Some(secs) = lookup("DISCORD_TIMEOUT_SECS") {
            let parsed: u64 = secs.parse().map_err(|_| ConfigError::InvalidVar {
                var: "DISCORD_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
            config.timeout = Duration::from_secs(parsed);
        }
        Ok(config)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("accept_language", &self.accept_language)
            .field("timeout", &self.timeout)
            .finish()
    }
}
