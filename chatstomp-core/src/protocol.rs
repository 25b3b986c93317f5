//! STOMP protocol constants and chat destination helpers
//!
//! Destinations are opaque to the client; the helpers below only render the
//! routing strings the chat backend publishes and subscribes on.

/// STOMP protocol constants
pub mod constants {
    /// Protocol version offered in CONNECT
    pub const ACCEPT_VERSION: &str = "1.2";

    /// Heartbeats are never negotiated
    pub const HEART_BEAT_NONE: &str = "0,0";

    /// The only acknowledgement mode used by subscriptions
    pub const ACK_AUTO: &str = "auto";

    /// Default content type of SEND frames
    pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

    /// Path of the STOMP endpoint on the chat backend
    pub const STOMP_ENDPOINT_PATH: &str = "/stomp";

    /// Endpoint used when no usable backend URL is configured
    pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8080/stomp";

    /// Prefix of generated subscription identifiers
    pub const SUBSCRIPTION_ID_PREFIX: &str = "sub-";

    /// `Authorization` header name
    pub const AUTHORIZATION: &str = "Authorization";
}

/// Chat backend destinations
pub mod destinations {
    /// Per-user validation error queue
    pub const USER_ERRORS: &str = "/user/queue/errors";

    /// Per-user unread notifications
    pub const USER_UNREADS: &str = "/user/unreads";

    /// Publish a chat message to a room
    pub fn publish_messages(room_id: impl std::fmt::Display) -> String {
        format!("/pub/{room_id}/messages")
    }

    /// Publish a read receipt for a room
    pub fn publish_read(room_id: impl std::fmt::Display) -> String {
        format!("/pub/{room_id}/read")
    }

    /// Subscribe to a room's message stream
    pub fn room_messages(room_id: impl std::fmt::Display) -> String {
        format!("/sub/{room_id}/messages")
    }
}

/// Render a bearer token as an `Authorization` header value
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
