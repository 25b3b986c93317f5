//! # ChatStomp
//!
//! **Minimal STOMP 1.2 client over WebSocket for the chat backend**
//!
//! ChatStomp speaks just enough STOMP to join chat rooms: the CONNECT
//! handshake, subscriptions and SEND, with frames issued before the
//! handshake queued and flushed in order. Message batches from REST pages
//! and live deliveries are folded into one ordered list by [`merge`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatstomp::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     chatstomp::logging::init_logging()?;
//!
//!     let (transport, mut events) = WsTransport::channel();
//!     let mut client = StompClient::new(transport, ClientConfig::from_env());
//!
//!     client.connect(header_list!["Authorization" => bearer("token")], |_| {}, |_| {})?;
//!     client.subscribe(&destinations::room_messages(1), |body, _| println!("{body}"))?;
//!     client.send(&destinations::publish_messages(1), r#"{"content":"hi"}"#, &HeaderList::new())?;
//!
//!     client.run_until_closed(&mut events).await;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

// Re-export core components
pub use chatstomp_core::*;

#[cfg(feature = "transport-ws")]
pub use chatstomp_transport_ws as transport_ws;

#[cfg(feature = "client")]
pub use chatstomp_client as client;

pub mod logging;

/// Prelude module with common imports
pub mod prelude {
    pub use chatstomp_core::prelude::*;

    #[cfg(feature = "client")]
    pub use chatstomp_client::prelude::*;

    #[cfg(feature = "transport-ws")]
    pub use chatstomp_transport_ws::prelude::*;
}
