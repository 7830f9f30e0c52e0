//! # cbackup-shell-screen
//!
//! VT100/ANSI screen rendering for the cBackup shell client.
//!
//! The scheduler shell is a real interactive terminal, so error banners can
//! arrive decorated with escape sequences: colors, cursor movement, partial
//! line rewrites. This crate renders a raw byte stream the way a terminal
//! would display it and reads the resulting text back, which is what strips
//! the decoration.
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends only on the VTE state
//! machine; cbackup-shell-decode builds on it to clean error banners.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod screen;

// Re-export commonly used types
pub use screen::{render_to_text, Screen};
