//! Error types for ChatStomp
//!
//! This module defines the error types shared by the ChatStomp crates.
//! Lenient paths (malformed inbound fragments, messages for removed
//! subscriptions) are logged and dropped rather than turned into errors, so
//! the variants here only describe failures a caller can act on.

use thiserror::Error;

/// Result type alias for ChatStomp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ChatStomp operations
#[derive(Error, Debug)]
pub enum Error {
    /// No transport has been opened, so there is no socket to queue against
    #[error("Not connected: call connect() before sending or subscribing")]
    NotConnected,

    /// Socket-level failure reported synchronously by a transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// A single fragment could not be decoded into a frame
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A JSON body could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Frame decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The fragment held no command line
    #[error("Empty frame")]
    Empty,

    /// The command line is not one of the supported STOMP verbs
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The endpoint URL could not be used
    #[error("Invalid url {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

impl Error {
    /// Create a transport error from anything printable
    pub fn transport(reason: impl std::fmt::Display) -> Self {
        Error::Transport(reason.to_string())
    }

    /// Whether this error means no connection was ever opened
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Error::NotConnected)
    }
}
