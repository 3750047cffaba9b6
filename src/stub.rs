//! Local echo reply service.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stands in for the real reply service during offline development and in
//! end-to-end tests of the HTTP path. It speaks the same wire format
//! (`{"message"}` in, `{"reply"}` out) and answers by echoing.

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::reply::{ChatReply, ChatRequest};

pub const EMPTY_MESSAGE_REPLY: &str = "Please say something!";

/// Echo reply for one message.
#[must_use]
pub fn echo_reply(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        EMPTY_MESSAGE_REPLY.to_string()
    } else {
        format!("You said: {message}")
    }
}

/// Router with `POST /chat` and `GET /healthz`.
#[must_use]
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve the stub on an already-bound listener until the task is dropped.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "stub reply service listening");
    axum::serve(listener, router()).await
}

async fn chat(Json(body): Json<ChatRequest>) -> Json<ChatReply> {
    Json(ChatReply::new(echo_reply(&body.message)))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "stub_test.rs"]
mod tests;
