//! # cbackup-shell-session
//!
//! Session lifecycle and command execution for the cBackup shell client.
//!
//! This crate provides:
//! - The transport abstraction and its SSH implementation
//! - Session establishment, teardown, and scoped release
//! - Prompt-synchronized command execution with pattern fallback
//! - The high-level [`SchedulerClient`]
//!
//! ## Architecture
//!
//! This is Layer 3 in the architecture - it depends on cbackup-shell-core
//! and cbackup-shell-decode to drive the scheduler shell over SSH.
//!
//! ## Concurrency
//!
//! The wire protocol has no request/response correlation: the only framing
//! signal is the prompt, so commands must never interleave on one
//! connection. Every command-running method takes `&mut self`, which makes
//! one-command-at-a-time a compile-time guarantee. Callers that need
//! concurrency open one session per concurrent command.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod executor;
pub mod session;
pub mod ssh;
pub mod transport;

// Re-export commonly used types
pub use client::SchedulerClient;
pub use executor::{strip_prompt, PROMPT};
pub use session::ShellSession;
pub use ssh::{SshDialer, SshTransport};
pub use transport::{Dialer, Transport};
