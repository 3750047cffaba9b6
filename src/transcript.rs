//! Transcript — the ordered list of exchanged messages.
//!
//! DESIGN
//! ======
//! Append-only. A `Message` is immutable once created: fields are private
//! and only readable through accessors. Nothing here is persisted; the
//! transcript lives as long as the controller that owns it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// SENDER
// =============================================================================

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
    Error,
}

impl Sender {
    /// Lowercase label used as the rendering class (`you`, `bot`, `error`).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Bot => "bot",
            Self::Error => "error",
        }
    }
}

// =============================================================================
// MESSAGE
// =============================================================================

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    sender: Sender,
    text: String,
}

impl Message {
    #[must_use]
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), sender, text: text.into() }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

// =============================================================================
// TRANSCRIPT
// =============================================================================

/// Ordered, append-only message list. Append order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a reference to the stored entry.
    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// `(sender, text)` pairs in order. Handy for assertions and logging.
    #[must_use]
    pub fn entries(&self) -> Vec<(Sender, &str)> {
        self.messages
            .iter()
            .map(|m| (m.sender, m.text.as_str()))
            .collect()
    }
}

#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;
