//! Error types for the cBackup shell client.

use thiserror::Error;

/// Main error type for scheduler shell operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Required connection parameter missing or invalid; raised before any I/O
    #[error("Configuration error: {0}")]
    Config(String),

    /// Low-level connect/read/write failure (DNS, refused, reset, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credential rejection during login
    #[error("Authentication failed. Host: {host}:{port}. Check SSH credentials")]
    Authentication {
        /// Scheduler host the login was attempted against
        host: String,
        /// Scheduler port the login was attempted against
        port: u16,
    },

    /// No prompt pattern matched the captured output before the timeout
    #[error("Failed to read command output: {0}")]
    FrameRead(String),

    /// A JSON-looking span was found but failed to parse
    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The scheduler itself rejected the command with an error banner
    #[error("Scheduler rejected command: {0}")]
    RemoteRejected(String),

    /// Invalid input or parameters (generic)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
