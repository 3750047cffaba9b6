//! Line-oriented terminal rendition of the chat surface.
//!
//! Each message is one line, `<label>> <text>`. The pending indicator is an
//! unterminated status line that is erased before the next message is
//! printed, which keeps the transcript scrolled to the latest entry.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::controller::{ChatController, ChatSurface, InputEvent, PendingReply, Submission};
use crate::transcript::Message;

const INDICATOR: &str = "bot is typing...";
const CLEAR_LINE: &str = "\r\x1b[2K";
const QUIT_COMMAND: &str = "/quit";

/// Render one message as a transcript line (without newline).
#[must_use]
pub fn format_message(message: &Message) -> String {
    format!("{}> {}", message.sender().label(), message.text())
}

struct TerminalState<W> {
    out: W,
    input: String,
    indicator: bool,
}

/// `ChatSurface` that writes the transcript to any `Write` sink.
pub struct TerminalSurface<W> {
    state: Mutex<TerminalState<W>>,
}

impl<W: Write + Send> TerminalSurface<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { state: Mutex::new(TerminalState { out, input: String::new(), indicator: false }) }
    }

    /// Replace the input field value (what the user typed).
    pub fn set_input(&self, value: &str) {
        self.lock().input = value.to_string();
    }

    /// Print a one-off status line that is not part of the transcript.
    pub fn notice(&self, text: &str) {
        self.emit(|state| {
            if state.indicator {
                write!(state.out, "{CLEAR_LINE}")?;
            }
            writeln!(state.out, "({text})")?;
            if state.indicator {
                write!(state.out, "{INDICATOR}")?;
            }
            Ok(())
        });
    }

    /// Everything written so far, for sinks that keep their bytes.
    pub fn written(&self) -> String
    where
        W: AsRef<[u8]>,
    {
        String::from_utf8_lossy(self.lock().out.as_ref()).into_owned()
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, f: impl FnOnce(&mut TerminalState<W>) -> std::io::Result<()>) {
        let mut state = self.lock();
        let state = &mut *state;
        if let Err(e) = f(state).and_then(|()| state.out.flush()) {
            warn!(error = %e, "terminal write failed");
        }
    }
}

impl<W: Write + Send> ChatSurface for TerminalSurface<W> {
    fn append_message(&self, message: &Message) {
        let line = format_message(message);
        self.emit(|state| {
            if state.indicator {
                write!(state.out, "{CLEAR_LINE}")?;
            }
            writeln!(state.out, "{line}")?;
            if state.indicator {
                write!(state.out, "{INDICATOR}")?;
            }
            Ok(())
        });
    }

    fn input_value(&self) -> String {
        self.lock().input.clone()
    }

    fn clear_input(&self) {
        self.lock().input.clear();
    }

    fn set_pending(&self, pending: bool) {
        self.emit(|state| {
            match (pending, state.indicator) {
                (true, false) => write!(state.out, "{INDICATOR}")?,
                (false, true) => write!(state.out, "{CLEAR_LINE}")?,
                _ => {}
            }
            state.indicator = pending;
            Ok(())
        });
    }
}

/// Read lines from `input` and submit each one as if Enter were pressed.
///
/// Stops at EOF or `/quit`, then waits for every in-flight reply to settle.
///
/// # Errors
///
/// Returns an error if reading from `input` fails.
pub async fn run_interactive<R, W>(
    controller: &ChatController,
    surface: &TerminalSurface<W>,
    input: R,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut lines = input.lines();
    let mut in_flight: Vec<PendingReply> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        if line.trim() == QUIT_COMMAND {
            break;
        }
        surface.set_input(&line);
        match controller.trigger(InputEvent::enter()) {
            Submission::Sent(pending) => in_flight.push(pending),
            Submission::Busy => surface.notice("still waiting for a reply; message not sent"),
            Submission::Ignored => {}
        }
    }

    debug!(count = in_flight.len(), "waiting for in-flight replies");
    for pending in in_flight {
        pending.await;
    }
    Ok(())
}

#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;
