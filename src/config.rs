//! Client and controller configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";
pub const DEFAULT_ERROR_TEXT: &str = "⚠️ Connection error!";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while building configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {key}={value}")]
    Parse { key: &'static str, value: String },

    /// The reply endpoint is not an absolute http(s) URL.
    #[error("invalid endpoint '{0}' (expected http:// or https:// URL)")]
    InvalidEndpoint(String),
}

// =============================================================================
// REPLY CLIENT CONFIG
// =============================================================================

/// Settings for the HTTP reply client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Sent as `user_id` in the request body when set.
    pub user_id: Option<String>,
    pub connect_timeout_secs: u64,
    /// `None` means no overall request timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_id: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CHAT_ENDPOINT`: default `http://127.0.0.1:5000/chat`
    /// - `CHAT_USER_ID`: omitted from requests when absent
    /// - `CHAT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CHAT_REQUEST_TIMEOUT_SECS`: unset or `0` disables the timeout
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or the endpoint is not
    /// an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build client config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = lookup("CHAT_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = validate_endpoint(&endpoint)?;
        let user_id = lookup("CHAT_USER_ID").filter(|v| !v.trim().is_empty());
        let connect_timeout_secs =
            parse_u64(&lookup, "CHAT_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let request_timeout_secs = parse_u64(&lookup, "CHAT_REQUEST_TIMEOUT_SECS")?.filter(|&secs| secs > 0);

        Ok(Self { endpoint, user_id, connect_timeout_secs, request_timeout_secs })
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

// =============================================================================
// CONTROLLER CONFIG
// =============================================================================

/// Behavior switches for the transcript controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Show the pending indicator while a reply is awaited.
    pub show_indicator: bool,
    /// Fallback text rendered as an error message on any reply failure.
    pub error_text: String,
    /// Accept a new submit while another reply is still in flight.
    pub allow_overlap: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { show_indicator: true, error_text: DEFAULT_ERROR_TEXT.to_string(), allow_overlap: false }
    }
}

impl ControllerConfig {
    /// Build controller config from environment variables.
    ///
    /// Optional:
    /// - `CHAT_SHOW_INDICATOR`: default `true`
    /// - `CHAT_ERROR_TEXT`: default `⚠️ Connection error!`
    /// - `CHAT_ALLOW_OVERLAP`: default `false`
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean flag cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build controller config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`ControllerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            show_indicator: parse_bool(&lookup, "CHAT_SHOW_INDICATOR")?.unwrap_or(defaults.show_indicator),
            error_text: lookup("CHAT_ERROR_TEXT")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.error_text),
            allow_overlap: parse_bool(&lookup, "CHAT_ALLOW_OVERLAP")?.unwrap_or(defaults.allow_overlap),
        })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Check that `raw` is an absolute http(s) URL and return it trimmed.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEndpoint`] otherwise.
pub fn validate_endpoint(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidEndpoint(raw.to_string())),
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<u64>, ConfigError> {
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Parse { key, value })
        })
        .transpose()
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<bool>, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Parse { key, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
