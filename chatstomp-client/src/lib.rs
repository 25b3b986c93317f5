//! ChatStomp Client
//!
//! STOMP 1.2 client state machine for the chat backend: handshake,
//! pre-connect frame queueing, subscriptions and lifecycle events.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatstomp_client::prelude::*;
//!
//! let transport = RecordingTransport::new();
//! let mut client = StompClient::new(transport.clone(), ClientConfig::default());
//!
//! client
//!     .connect(header_list!["Authorization" => bearer("token")], |_| {}, |_| {})
//!     .unwrap();
//! let id = client
//!     .subscribe(&destinations::room_messages(1), |body, _| println!("{body}"))
//!     .unwrap();
//!
//! client.handle_transport_event(TransportEvent::Opened);
//! client.handle_transport_event(TransportEvent::Message("CONNECTED\nversion:1.2\n\n\0".into()));
//!
//! assert_eq!(id, "sub-1");
//! assert!(client.is_connected());
//! assert_eq!(transport.sent_commands(), vec!["CONNECT", "SUBSCRIBE"]);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

// Public modules
pub mod client;
pub mod config;
pub mod event;
pub mod observer;
pub mod registry;
pub mod token_store;

// Prelude module
pub mod prelude;

// Re-export key types for convenience
pub use client::{ConnectionStatus, StompClient};
pub use config::ClientConfig;
pub use event::{ClientEvent, ConnectFailure, EventListener};
pub use observer::{FrameLog, FrameLogEntry, FrameObserver, SentFrame};
pub use registry::{Dispatch, SubscriptionRegistry};
pub use token_store::{MemoryTokenStore, TokenStore};
