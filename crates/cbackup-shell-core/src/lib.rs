//! # cbackup-shell-core
//!
//! Core types for the cBackup shell client.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other cbackup-shell crates. It provides:
//!
//! - Connection configuration (raw settings and the resolved `SessionConfig`)
//! - The scheduler command vocabulary
//! - Decoded command replies
//! - Session identifiers
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other cbackup-shell crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all modules
pub mod command;
pub mod config;
pub mod error;
pub mod reply;
pub mod session;

// Re-export commonly used types
pub use command::SchedulerCommand;
pub use config::{ClientConfig, SchedulerSettings, SessionConfig, TimeoutSettings};
pub use error::{Error, Result};
pub use reply::DecodedResult;
pub use session::SessionId;
