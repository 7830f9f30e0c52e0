//! Shell session lifecycle.

use tracing::{info, warn};

use cbackup_shell_core::{ClientConfig, Error, Result, SessionConfig, SessionId};

use crate::ssh::SshDialer;
use crate::transport::{Dialer, Transport};

/// An established, authenticated session with the scheduler shell.
///
/// A session owns exactly one transport connection and serializes one
/// command at a time: every command-running method takes `&mut self`, so
/// exclusive access is enforced by the borrow checker rather than by
/// convention. The connection is released on [`close`](Self::close) or when
/// the session is dropped.
///
/// After a command times out ([`Error::FrameRead`]) the framing state of the
/// connection is unknown; close the session and connect a fresh one instead
/// of reusing it.
pub struct ShellSession {
    id: SessionId,
    config: SessionConfig,
    transport: Option<Box<dyn Transport>>,
    /// Bytes captured from the transport, pending frame extraction
    pub(crate) capture: String,
    /// Whether the post-login greeting has been awaited
    pub(crate) greeted: bool,
}

impl std::fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellSession")
            .field("id", &self.id)
            .field("endpoint", &self.config.endpoint())
            .field("open", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl ShellSession {
    /// Validate `settings` and connect over SSH.
    ///
    /// Validation runs first: missing port, username, or password is a
    /// [`Error::Config`] raised before any network I/O.
    pub fn connect(settings: &ClientConfig) -> Result<Self> {
        Self::connect_with(settings, &SshDialer)
    }

    /// Like [`connect`](Self::connect), but through an explicit dialer.
    pub fn connect_with(settings: &ClientConfig, dialer: &dyn Dialer) -> Result<Self> {
        let config = settings.resolve()?;
        let transport = dialer.dial(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Wrap an already-open transport.
    pub fn with_transport(config: SessionConfig, transport: Box<dyn Transport>) -> Self {
        let id = SessionId::new();
        info!("Session established: id={}, endpoint={}", id, config.endpoint());
        Self {
            id,
            config,
            transport: Some(transport),
            capture: String::new(),
            greeted: false,
        }
    }

    /// The session identifier (for log correlation).
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The resolved connection parameters.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the transport is still held.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Run a command over a one-shot exec channel, bypassing the interactive
    /// shell and its prompt framing. Returns the trimmed output.
    pub fn exec_once(&mut self, command: &str) -> Result<String> {
        self.transport_mut()?.exec(command)
    }

    /// Release the transport. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut transport) = self.transport.take() {
            info!("Closing session: id={}", self.id);
            transport.close()?;
        }
        Ok(())
    }

    pub(crate) fn transport_mut(&mut self) -> Result<&mut (dyn Transport + 'static)> {
        match self.transport.as_deref_mut() {
            Some(transport) => Ok(transport),
            None => Err(Error::Transport("session is closed".to_string())),
        }
    }
}

impl Drop for ShellSession {
    fn drop(&mut self) {
        if self.transport.is_some() {
            if let Err(e) = self.close() {
                warn!("Error closing session {}: {}", self.id, e);
            }
        }
    }
}
