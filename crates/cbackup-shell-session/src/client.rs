//! High-level scheduler client.

use serde_json::{Map, Value};
use tracing::info;

use cbackup_shell_core::{ClientConfig, DecodedResult, Result, SchedulerCommand};
use cbackup_shell_decode::decode_frame;

use crate::session::ShellSession;
use crate::transport::Dialer;

/// Typed facade over a [`ShellSession`]: renders commands, runs them, and
/// decodes the replies.
///
/// [`execute`](Self::execute) surfaces a remote error banner as
/// [`DecodedResult::Failure`] - the scheduler rejecting a command is a
/// normal outcome, distinct from not being able to talk to it. The typed
/// convenience methods trade that distinction for ergonomics and map a
/// banner to [`Error::RemoteRejected`](cbackup_shell_core::Error::RemoteRejected).
#[derive(Debug)]
pub struct SchedulerClient {
    session: ShellSession,
}

impl SchedulerClient {
    /// Validate `settings` and connect over SSH.
    pub fn connect(settings: &ClientConfig) -> Result<Self> {
        Ok(Self::from_session(ShellSession::connect(settings)?))
    }

    /// Like [`connect`](Self::connect), but through an explicit dialer.
    pub fn connect_with(settings: &ClientConfig, dialer: &dyn Dialer) -> Result<Self> {
        Ok(Self::from_session(ShellSession::connect_with(
            settings, dialer,
        )?))
    }

    /// Wrap an established session.
    pub fn from_session(session: ShellSession) -> Self {
        Self { session }
    }

    /// Borrow the underlying session.
    pub fn session(&self) -> &ShellSession {
        &self.session
    }

    /// Mutably borrow the underlying session, e.g. for
    /// [`exec_once`](ShellSession::exec_once).
    pub fn session_mut(&mut self) -> &mut ShellSession {
        &mut self.session
    }

    /// Run one command and decode its reply.
    pub fn execute(&mut self, command: &SchedulerCommand) -> Result<DecodedResult> {
        info!("Executing scheduler command: {}", command);
        let frame = self.session.run(&command.to_line())?;
        decode_frame(&frame)
    }

    /// Start the scheduler.
    pub fn start(&mut self) -> Result<Map<String, Value>> {
        self.execute(&SchedulerCommand::Start)?.into_map()
    }

    /// Restart the scheduler.
    pub fn restart(&mut self) -> Result<Map<String, Value>> {
        self.execute(&SchedulerCommand::Restart)?.into_map()
    }

    /// Stop the scheduler.
    pub fn stop(&mut self) -> Result<Map<String, Value>> {
        self.execute(&SchedulerCommand::Stop)?.into_map()
    }

    /// Query scheduler status.
    pub fn status(&mut self) -> Result<Map<String, Value>> {
        self.execute(&SchedulerCommand::Status)?.into_map()
    }

    /// Query scheduler version.
    pub fn version(&mut self) -> Result<Map<String, Value>> {
        self.execute(&SchedulerCommand::Version)?.into_map()
    }

    /// Run a single node backup.
    pub fn backup(&mut self, node_id: u64) -> Result<Map<String, Value>> {
        self.execute(&SchedulerCommand::Backup { node_id })?
            .into_map()
    }

    /// Run a named task.
    pub fn run_task(&mut self, name: &str) -> Result<Map<String, Value>> {
        self.execute(&SchedulerCommand::RunTask {
            name: name.to_string(),
        })?
        .into_map()
    }

    /// Fetch the shell's plain-text help screen.
    pub fn help(&mut self) -> Result<String> {
        self.session.run(&SchedulerCommand::Help.to_line())
    }

    /// Close the underlying session. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        self.session.close()
    }
}
