//! Prelude module for ChatStomp Core
//!
//! This module re-exports commonly used types and traits to make them
//! easily accessible for users of the library.

pub use crate::codec::{decode, encode};
pub use crate::error::{ConfigError, Error, FrameError, Result};
pub use crate::frame::{Command, Frame};
pub use crate::header::{Header, HeaderList};
pub use crate::header_list;
pub use crate::protocol::{bearer, constants, destinations};
pub use crate::reconcile::{merge, HasMessageId, MessageId, MessageList};
pub use crate::transport::{RecordingTransport, Transport, TransportEvent};

// Re-export commonly used external dependencies
pub use thiserror::Error as ThisError;

// Feature-gated re-exports
#[cfg(feature = "serde")]
pub use serde::{Deserialize, Serialize};
