//! Chat transcript controller.
//!
//! DESIGN
//! ======
//! Mediates between input events, the reply service, and the rendered
//! transcript. Collaborators are injected: a `ChatSurface` that renders
//! messages, exposes the input field, and toggles the pending indicator;
//! and a `ReplyService` that fetches the bot reply.
//!
//! `submit` does its visible work synchronously (user message rendered,
//! input cleared, indicator shown) and then spawns the request on the
//! tokio runtime. The returned `PendingReply` resolves once the bot or
//! error message has been appended, so callers and tests can await a
//! round trip deterministically.
//!
//! CONCURRENCY
//! ===========
//! Transcript and in-flight count sit behind one `std::sync::Mutex` that is
//! never held across an await. Surface calls are made under the lock so the
//! rendered order always equals transcript order. By default a submit while
//! a reply is pending is rejected (`Submission::Busy`); with
//! `allow_overlap` requests run independently and replies land in whatever
//! order they resolve.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::ControllerConfig;
use crate::reply::ReplyService;
use crate::transcript::{Message, Sender, Transcript};

// =============================================================================
// SURFACE
// =============================================================================

/// Rendering side of the chat: message list, input field, pending indicator.
pub trait ChatSurface: Send + Sync {
    /// Render a newly appended message and scroll it into view.
    fn append_message(&self, message: &Message);

    /// Current value of the input field.
    fn input_value(&self) -> String;

    /// Empty the input field.
    fn clear_input(&self);

    /// Show or hide the pending ("typing") indicator.
    fn set_pending(&self, pending: bool);
}

/// A raw user action on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The send trigger was activated.
    SendClicked,
    /// A key was pressed while the input field had focus.
    KeyPressed(String),
}

impl InputEvent {
    #[must_use]
    pub fn enter() -> Self {
        Self::KeyPressed("Enter".to_string())
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingState {
    Idle,
    Waiting,
}

struct ControllerState {
    transcript: Transcript,
    in_flight: usize,
}

/// Outcome of a submit attempt.
#[must_use]
#[derive(Debug)]
pub enum Submission {
    /// Empty input after trimming (or a non-send key); nothing happened.
    Ignored,
    /// A reply is still pending and overlapping sends are disabled.
    Busy,
    /// The user message was appended and a request is in flight.
    Sent(PendingReply),
}

impl Submission {
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    #[must_use]
    pub fn into_pending(self) -> Option<PendingReply> {
        match self {
            Self::Sent(pending) => Some(pending),
            Self::Ignored | Self::Busy => None,
        }
    }
}

/// Completion signal for one round trip.
///
/// Resolves to the sender of the message appended for the response:
/// `Sender::Bot` on success, `Sender::Error` on failure.
#[derive(Debug)]
pub struct PendingReply {
    handle: JoinHandle<Sender>,
}

impl Future for PendingReply {
    type Output = Sender;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.unwrap_or(Sender::Error))
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Owns the transcript and the lifecycle of outgoing reply requests.
#[derive(Clone)]
pub struct ChatController {
    inner: Arc<Inner>,
}

struct Inner {
    surface: Arc<dyn ChatSurface>,
    replies: Arc<dyn ReplyService>,
    config: ControllerConfig,
    state: Mutex<ControllerState>,
}

impl ChatController {
    #[must_use]
    pub fn new(surface: Arc<dyn ChatSurface>, replies: Arc<dyn ReplyService>, config: ControllerConfig) -> Self {
        let state = ControllerState { transcript: Transcript::new(), in_flight: 0 };
        Self { inner: Arc::new(Inner { surface, replies, config, state: Mutex::new(state) }) }
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Submit raw input text.
    ///
    /// Must be called from within a tokio runtime: the request is spawned
    /// onto it.
    pub fn submit(&self, raw_text: &str) -> Submission {
        let text = raw_text.trim();
        if text.is_empty() {
            return Submission::Ignored;
        }

        {
            let mut state = self.inner.lock();
            if state.in_flight > 0 && !self.inner.config.allow_overlap {
                debug!(in_flight = state.in_flight, "send ignored while reply pending");
                return Submission::Busy;
            }
            let stored = state.transcript.push(Message::new(Sender::User, text));
            self.inner.surface.append_message(stored);
            self.inner.surface.clear_input();
            state.in_flight += 1;
            if state.in_flight == 1 && self.inner.config.show_indicator {
                self.inner.surface.set_pending(true);
            }
        }

        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        let handle = tokio::spawn(async move { inner.resolve(text).await });
        Submission::Sent(PendingReply { handle })
    }

    /// Handle a raw input event. Clicking send and pressing Enter both
    /// submit the current input value; any other key is ignored.
    pub fn trigger(&self, event: InputEvent) -> Submission {
        match event {
            InputEvent::SendClicked => {}
            InputEvent::KeyPressed(key) if key == "Enter" => {}
            InputEvent::KeyPressed(_) => return Submission::Ignored,
        }
        let raw = self.inner.surface.input_value();
        self.submit(&raw)
    }

    /// Snapshot of the transcript.
    #[must_use]
    pub fn transcript(&self) -> Transcript {
        self.inner.lock().transcript.clone()
    }

    #[must_use]
    pub fn pending_state(&self) -> PendingState {
        if self.inner.lock().in_flight > 0 { PendingState::Waiting } else { PendingState::Idle }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_state() == PendingState::Waiting
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn resolve(&self, text: String) -> Sender {
        // Run the call in its own task so a panicking service still settles.
        let replies = Arc::clone(&self.replies);
        let outcome = tokio::spawn(async move { replies.reply(&text).await }).await;

        let message = match outcome {
            Ok(Ok(reply)) => Message::new(Sender::Bot, reply),
            Ok(Err(e)) => {
                warn!(error = %e, "reply fetch failed");
                Message::new(Sender::Error, self.config.error_text.clone())
            }
            Err(e) => {
                warn!(error = %e, "reply task aborted");
                Message::new(Sender::Error, self.config.error_text.clone())
            }
        };
        self.finish(message)
    }

    fn finish(&self, message: Message) -> Sender {
        let sender = message.sender();
        let mut state = self.lock();
        let stored = state.transcript.push(message);
        self.surface.append_message(stored);
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.in_flight == 0 && self.config.show_indicator {
            self.surface.set_pending(false);
        }
        sender
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
