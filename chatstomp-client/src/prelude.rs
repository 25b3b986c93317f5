//! Prelude module for ChatStomp Client
//!
//! This module re-exports commonly used types and traits to make them
//! easily accessible for users of the client library.

pub use crate::client::{ConnectionStatus, StompClient};
pub use crate::config::ClientConfig;
pub use crate::event::{ClientEvent, ConnectFailure, EventListener};
pub use crate::observer::{FrameLog, FrameObserver, SentFrame};
pub use crate::token_store::{MemoryTokenStore, TokenStore};

// Re-export core types for convenience
pub use chatstomp_core::prelude::*;
