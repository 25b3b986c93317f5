//! # ChatStomp Core
//!
//! Protocol building blocks shared by the ChatStomp client crates.
//!
//! This crate holds everything that does not need a running socket:
//!
//! - Error handling and types
//! - STOMP frame model and the text wire codec
//! - Ordered header lists with default/override precedence
//! - Protocol constants and chat destination helpers
//! - Transport abstraction and an in-memory recording transport
//! - Reconciliation of chat message batches into an ordered list

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![doc(html_root_url = "https://docs.rs/chatstomp-core/")]

// Core modules
pub mod codec;
pub mod error;
pub mod header;
pub mod frame;
pub mod protocol;
pub mod reconcile;
pub mod transport;

// Prelude module with common imports
pub mod prelude;

// Re-export key types for convenience
pub use codec::{decode, encode};
pub use error::{ConfigError, Error, FrameError, Result};
pub use frame::{Command, Frame};
pub use header::{Header, HeaderList};
pub use reconcile::{merge, HasMessageId, MessageId, MessageList};
pub use transport::{RecordingTransport, Transport, TransportEvent};
