//! Reply service — the single JSON POST/response pair.
//!
//! DESIGN
//! ======
//! `ReplyService` is the seam the controller talks to, so tests can swap in
//! a mock. `HttpReplyClient` is the real implementation: it POSTs
//! `{"message": ...}` to the configured endpoint and expects
//! `{"reply": ...}` back. Every failure mode (transport, non-2xx status,
//! unparseable body) surfaces as a `ReplyError`; the controller collapses
//! them into one user-visible fallback message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by reply client operations.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    /// The HTTP request could not be sent or its body not read.
    #[error("reply request failed: {0}")]
    Request(String),

    /// The reply service returned a non-success HTTP status.
    #[error("reply service error: status {status}")]
    Status { status: u16, body: String },

    /// The response body was not JSON or had no string `reply` field.
    #[error("reply parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Request body sent to the reply service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Response body returned by the reply service.
///
/// Only `reply` is required. Anything else the service adds (sentiment,
/// match type, confidence) is kept in `extra` for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub reply: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ChatReply {
    #[must_use]
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), extra: serde_json::Map::new() }
    }
}

/// Parse a raw response body into a [`ChatReply`].
///
/// # Errors
///
/// Returns [`ReplyError::Parse`] if the body is not JSON or `reply` is not
/// a string.
pub fn parse_reply(body: &str) -> Result<ChatReply, ReplyError> {
    serde_json::from_str::<ChatReply>(body).map_err(|e| ReplyError::Parse(e.to_string()))
}

// =============================================================================
// SERVICE TRAIT
// =============================================================================

/// Async seam for fetching a bot reply. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ReplyService: Send + Sync {
    /// Send one user message and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns a [`ReplyError`] if the request fails or the response is
    /// malformed.
    async fn reply(&self, message: &str) -> Result<String, ReplyError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// `reqwest`-backed reply client.
pub struct HttpReplyClient {
    http: reqwest::Client,
    endpoint: String,
    user_id: Option<String>,
}

impl HttpReplyClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::HttpClientBuild`] if the HTTP client fails to
    /// build.
    pub fn new(config: ClientConfig) -> Result<Self, ReplyError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ReplyError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: config.endpoint, user_id: config.user_id })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_json(&self, body: &ChatRequest) -> Result<String, ReplyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| ReplyError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ReplyError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(ReplyError::Status { status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl ReplyService for HttpReplyClient {
    async fn reply(&self, message: &str) -> Result<String, ReplyError> {
        let body = ChatRequest { message: message.to_string(), user_id: self.user_id.clone() };
        debug!(endpoint = %self.endpoint, len = message.len(), "sending chat request");
        let text = self.send_json(&body).await?;
        let reply = parse_reply(&text)?;
        if !reply.extra.is_empty() {
            debug!(extra = ?reply.extra, "reply metadata");
        }
        Ok(reply.reply)
    }
}

#[cfg(test)]
#[path = "reply_test.rs"]
mod tests;
