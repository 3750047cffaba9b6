use super::*;
use crate::config::ControllerConfig;
use crate::reply::{ReplyError, ReplyService};
use crate::transcript::Sender;
use std::sync::Arc;

struct FixedReplies(Result<&'static str, &'static str>);

#[async_trait::async_trait]
impl ReplyService for FixedReplies {
    async fn reply(&self, _message: &str) -> Result<String, ReplyError> {
        self.0
            .map(str::to_string)
            .map_err(|e| ReplyError::Request(e.to_string()))
    }
}

fn terminal_with(
    replies: FixedReplies,
    config: ControllerConfig,
) -> (ChatController, Arc<TerminalSurface<Vec<u8>>>) {
    let surface = Arc::new(TerminalSurface::new(Vec::new()));
    let controller = ChatController::new(surface.clone(), Arc::new(replies), config);
    (controller, surface)
}

// =============================================================
// rendering
// =============================================================

#[test]
fn format_message_uses_sender_label() {
    assert_eq!(format_message(&Message::new(Sender::User, "Hello")), "you> Hello");
    assert_eq!(format_message(&Message::new(Sender::Bot, "Hi")), "bot> Hi");
    assert_eq!(format_message(&Message::new(Sender::Error, "down")), "error> down");
}

#[test]
fn input_value_round_trips_and_clears() {
    let surface = TerminalSurface::new(Vec::new());
    surface.set_input("draft");
    assert_eq!(surface.input_value(), "draft");
    surface.clear_input();
    assert_eq!(surface.input_value(), "");
}

#[test]
fn indicator_is_erased_before_next_message() {
    let surface = TerminalSurface::new(Vec::new());
    surface.set_pending(true);
    surface.append_message(&Message::new(Sender::Bot, "done"));
    surface.set_pending(false);

    assert_eq!(
        surface.written(),
        format!("{INDICATOR}{CLEAR_LINE}bot> done\n{INDICATOR}{CLEAR_LINE}")
    );
}

#[test]
fn repeated_pending_toggles_write_once() {
    let surface = TerminalSurface::new(Vec::new());
    surface.set_pending(true);
    surface.set_pending(true);
    surface.set_pending(false);
    surface.set_pending(false);
    assert_eq!(surface.written(), format!("{INDICATOR}{CLEAR_LINE}"));
}

#[test]
fn notice_is_parenthesised() {
    let surface = TerminalSurface::new(Vec::new());
    surface.notice("hold on");
    assert_eq!(surface.written(), "(hold on)\n");
}

// =============================================================
// run_interactive
// =============================================================

#[tokio::test]
async fn interactive_round_trip() {
    let (controller, surface) = terminal_with(FixedReplies(Ok("Hi there")), ControllerConfig::default());

    run_interactive(&controller, &*surface, &b"Hello\n"[..]).await.unwrap();

    assert_eq!(controller.transcript().entries(), vec![(Sender::User, "Hello"), (Sender::Bot, "Hi there")]);
    let written = surface.written();
    assert!(written.contains("you> Hello\n"));
    assert!(written.contains("bot> Hi there\n"));
    assert!(!controller.is_pending());
}

#[tokio::test]
async fn interactive_skips_blank_lines_and_stops_at_quit() {
    let (controller, surface) = terminal_with(
        FixedReplies(Ok("ok")),
        ControllerConfig { show_indicator: false, ..ControllerConfig::default() },
    );

    run_interactive(&controller, &*surface, &b"   \n/quit\nnever sent\n"[..])
        .await
        .unwrap();

    assert!(controller.transcript().is_empty());
    assert_eq!(surface.written(), "");
}

#[tokio::test]
async fn interactive_failure_renders_error_line() {
    let config = ControllerConfig { error_text: "no connection".into(), ..ControllerConfig::default() };
    let (controller, surface) = terminal_with(FixedReplies(Err("refused")), config);

    run_interactive(&controller, &*surface, &b"Ping\n"[..]).await.unwrap();

    assert_eq!(controller.transcript().entries(), vec![(Sender::User, "Ping"), (Sender::Error, "no connection")]);
    assert!(surface.written().contains("error> no connection\n"));
}
