//! WebSocket Transport for ChatStomp
//!
//! This module provides the tokio-tungstenite backed [`Transport`] used to
//! reach the STOMP broker.
//!
//! [`Transport`]: chatstomp_core::Transport

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod ws;

// Re-export WebSocket transport types
pub use ws::WsTransport;

/// Prelude module
pub mod prelude {
    pub use crate::ws::WsTransport;
    pub use chatstomp_core::transport::{Transport, TransportEvent};
}
