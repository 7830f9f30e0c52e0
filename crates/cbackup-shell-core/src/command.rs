//! The scheduler shell command vocabulary.

use serde::{Deserialize, Serialize};

/// A command understood by the scheduler shell.
///
/// The shell is line-oriented: each command is a single line, and commands
/// that should produce machine-readable output carry a trailing `-json`
/// flag. [`SchedulerCommand::to_line`] renders the exact wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerCommand {
    /// Start the scheduler
    Start,
    /// Restart the scheduler
    Restart,
    /// Stop the scheduler
    Stop,
    /// Run a single node backup
    Backup {
        /// Node identifier
        node_id: u64,
    },
    /// Run a named task
    RunTask {
        /// Task name
        name: String,
    },
    /// Query scheduler status
    Status,
    /// Query scheduler version
    Version,
    /// Show the shell's help text (plain text reply, no `-json`)
    Help,
    /// An arbitrary raw command line, sent verbatim
    Raw(String),
}

impl SchedulerCommand {
    /// Render the wire-format command line (without the trailing newline).
    pub fn to_line(&self) -> String {
        match self {
            Self::Start => "start -json".to_string(),
            Self::Restart => "restart -json".to_string(),
            Self::Stop => "stop -json".to_string(),
            Self::Backup { node_id } => format!("backup {node_id} -json"),
            Self::RunTask { name } => format!("runtask {name} -json"),
            Self::Status => "status -json".to_string(),
            Self::Version => "version -json".to_string(),
            Self::Help => "help".to_string(),
            Self::Raw(line) => line.clone(),
        }
    }

    /// Whether the reply is expected to contain a JSON payload.
    pub fn expects_json(&self) -> bool {
        !matches!(self, Self::Help)
    }
}

impl std::fmt::Display for SchedulerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_line())
    }
}
