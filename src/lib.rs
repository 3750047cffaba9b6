//! chatline — terminal chat client for a JSON reply service.
//!
//! DESIGN
//! ======
//! One core component, the transcript controller, with its collaborators
//! injected: a `ChatSurface` for rendering and input, and a `ReplyService`
//! for fetching replies. The terminal surface and the HTTP reply client are
//! the production implementations; the stub module provides a local echo
//! service speaking the same wire format.

pub mod config;
pub mod controller;
pub mod reply;
pub mod stub;
pub mod terminal;
pub mod transcript;

pub use config::{ClientConfig, ConfigError, ControllerConfig};
pub use controller::{ChatController, ChatSurface, InputEvent, PendingReply, PendingState, Submission};
pub use reply::{HttpReplyClient, ReplyError, ReplyService};
pub use transcript::{Message, Sender, Transcript};
