//! Transport abstraction over the remote shell connection.

use std::time::Duration;

use cbackup_shell_core::{Result, SessionConfig};

/// A bidirectional byte pipe to the scheduler shell.
///
/// The transport knows nothing about prompts or frames; it moves bytes and
/// bounds every blocking read with a caller-supplied timeout. Framing lives
/// in the executor.
pub trait Transport: Send {
    /// Write raw bytes to the remote shell.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Block until some output arrives, up to `timeout`.
    ///
    /// Returns at least one byte on success. A timeout, a closed connection,
    /// and a low-level read failure all surface as
    /// [`Error::Transport`](cbackup_shell_core::Error::Transport).
    fn read_chunk(&mut self, timeout: Duration) -> Result<Vec<u8>>;

    /// Run a command over a one-shot exec channel, outside the interactive
    /// shell, and return its trimmed output.
    fn exec(&mut self, command: &str) -> Result<String>;

    /// Release the underlying connection. Idempotent.
    fn close(&mut self) -> Result<()>;
}

/// Connection factory: the seam between session establishment and the
/// network.
///
/// Production code uses [`SshDialer`](crate::SshDialer); tests substitute a
/// double to script traffic or to prove that configuration errors perform
/// zero connection attempts.
pub trait Dialer {
    /// Open a transport to the endpoint described by `config`.
    ///
    /// `config` has already passed validation; implementations only deal
    /// with network and authentication failures.
    fn dial(&self, config: &SessionConfig) -> Result<Box<dyn Transport>>;
}
