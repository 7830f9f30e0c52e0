//! Prompt-synchronized command execution.
//!
//! The scheduler shell offers no message framing: no length prefix, no
//! delimiter guarantee, no acknowledgement. The only signal that a command's
//! output is complete is the literal prompt `cbackup> ` reappearing, and how
//! that token is terminated (trailing space, trailing newline, or neither)
//! varies with remote buffering. The executor therefore matches an ordered
//! list of increasingly permissive prompt patterns and accepts the first
//! success; only when every pattern fails is the command declared dead.

use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use cbackup_shell_core::{Error, Result};

use crate::session::ShellSession;

/// The literal prompt token the scheduler shell prints after each command.
pub const PROMPT: &str = "cbackup> ";

lazy_static! {
    // Post-login greeting: anything ending in "> " at the end of the capture.
    static ref GREETING_PATTERN: Regex = Regex::new(r"(?s).*>\s\z").unwrap();

    // Ordered from strict to permissive; first match wins.
    static ref PROMPT_PATTERNS: Vec<Regex> = vec![
        // Prompt at the very end of the capture, optional trailing spaces
        Regex::new(r"cbackup>[ \t]*\z").unwrap(),
        // Prompt at any line boundary
        Regex::new(r"(?m)cbackup>\s*$").unwrap(),
        // Dot-all: the whole capture ends with the prompt
        Regex::new(r"(?s).*cbackup>\s*\z").unwrap(),
        // Greedy anything-then-prompt
        Regex::new(r".*cbackup>\s*$").unwrap(),
    ];

    static ref PROMPT_STRIP: Regex = Regex::new(r"(?m)cbackup>\s*$").unwrap();
}

/// Remove the trailing prompt token from a captured frame and trim the
/// surrounding whitespace. The prompt is a framing artifact, not payload.
/// Idempotent: stripping an already-stripped frame is a no-op.
pub fn strip_prompt(text: &str) -> String {
    PROMPT_STRIP.replace_all(text, "").trim().to_string()
}

impl ShellSession {
    /// Send one command line and return the raw text of its response frame,
    /// with the prompt stripped.
    ///
    /// On a freshly connected session this first waits (best effort) for the
    /// login greeting; a greeting timeout is logged and ignored, because the
    /// remote side may have emitted its prompt before the read began. A
    /// missing prompt after the command itself is fatal for the command:
    /// [`Error::FrameRead`] wrapping the last underlying read error.
    pub fn run(&mut self, line: &str) -> Result<String> {
        if line.contains('\n') || line.contains('\r') {
            return Err(Error::InvalidInput(
                "command line must not contain newlines".to_string(),
            ));
        }

        if !self.greeted {
            self.await_greeting();
        }

        debug!("Sending command: id={}, line={:?}", self.id(), line);
        let payload = format!("{line}\n");
        self.transport_mut()?.send(payload.as_bytes())?;

        let frame = self.await_frame()?;
        let frame = strip_prompt(&frame);
        if frame.is_empty() {
            warn!("Empty output from scheduler command: {:?}", line);
        } else {
            debug!("Command output: {} chars", frame.len());
        }
        Ok(frame)
    }

    /// Wait for the post-login greeting prompt. Best effort: a timeout here
    /// is not a failure, the session proceeds either way.
    fn await_greeting(&mut self) {
        self.greeted = true;
        let timeout = self.config().greeting_timeout;
        match self.read_until(&GREETING_PATTERN, timeout) {
            Ok(greeting) => {
                debug!("Greeting received: id={}, {} chars", self.id(), greeting.len());
            }
            Err(e) => {
                warn!("Could not read initial prompt: {}", e);
            }
        }
    }

    /// Wait for the prompt to reappear, trying each pattern in order.
    ///
    /// Captured bytes persist across failed attempts, so a later, more
    /// permissive pattern re-examines everything an earlier attempt already
    /// read without extra I/O.
    fn await_frame(&mut self) -> Result<String> {
        let timeout = self.config().command_timeout;
        let mut last_err: Option<Error> = None;

        for pattern in PROMPT_PATTERNS.iter() {
            match self.read_until(pattern, timeout) {
                Ok(frame) => return Ok(frame),
                Err(e) => {
                    debug!("Prompt pattern {:?} failed: {}", pattern.as_str(), e);
                    last_err = Some(e);
                }
            }
        }

        let cause = match last_err {
            Some(e) => e.to_string(),
            None => "no prompt pattern matched".to_string(),
        };
        Err(Error::FrameRead(cause))
    }

    /// Accumulate transport output until `pattern` matches the capture or
    /// the deadline passes. On success the capture is drained and returned;
    /// on failure it is retained for the next attempt.
    fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        loop {
            if pattern.is_match(&self.capture) {
                return Ok(std::mem::take(&mut self.capture));
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Transport(format!(
                    "timed out after {}s waiting for pattern {:?}",
                    timeout.as_secs_f64(),
                    pattern.as_str()
                )));
            }

            let chunk = self.transport_mut()?.read_chunk(deadline - now)?;
            self.capture.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}
