//! STOMP frame model
//!
//! A frame is a command, an ordered header list and a text body. The
//! constructors here produce the client frames with the default headers the
//! server expects; caller-supplied headers are layered on top of those
//! defaults so callers win on key collision.

use crate::codec;
use crate::error::FrameError;
use crate::header::HeaderList;
use crate::protocol::constants;
use std::fmt;
use std::str::FromStr;

/// STOMP commands understood by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Client handshake
    Connect,
    /// Server handshake reply
    Connected,
    /// Register interest in a destination
    Subscribe,
    /// Drop a subscription
    Unsubscribe,
    /// Publish to a destination
    Send,
    /// Server delivery for a subscription
    Message,
    /// Server-side protocol error
    Error,
    /// Graceful client shutdown
    Disconnect,
}

impl Command {
    /// Wire name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Connected => "CONNECTED",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Send => "SEND",
            Command::Message => "MESSAGE",
            Command::Error => "ERROR",
            Command::Disconnect => "DISCONNECT",
        }
    }

    /// Check if the server sends this command
    pub fn is_server_command(&self) -> bool {
        matches!(self, Command::Connected | Command::Message | Command::Error)
    }
}

impl FromStr for Command {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Command::Connect),
            "CONNECTED" => Ok(Command::Connected),
            "SUBSCRIBE" => Ok(Command::Subscribe),
            "UNSUBSCRIBE" => Ok(Command::Unsubscribe),
            "SEND" => Ok(Command::Send),
            "MESSAGE" => Ok(Command::Message),
            "ERROR" => Ok(Command::Error),
            "DISCONNECT" => Ok(Command::Disconnect),
            "" => Err(FrameError::Empty),
            other => Err(FrameError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single STOMP frame
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Frame command
    pub command: Command,
    /// Ordered headers
    pub headers: HeaderList,
    /// Text body, possibly empty
    pub body: String,
}

impl Frame {
    /// Create a frame with no headers and an empty body
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: HeaderList::new(),
            body: String::new(),
        }
    }

    /// Create a frame from its parts
    pub fn with_parts(command: Command, headers: HeaderList, body: impl Into<String>) -> Self {
        Self {
            command,
            headers,
            body: body.into(),
        }
    }

    /// Encode this frame to its NUL-terminated wire form
    pub fn encode(&self) -> String {
        codec::encode(self.command, &self.headers, &self.body)
    }

    /// Parse one NUL-free fragment into a frame
    pub fn parse(fragment: &str) -> Result<Frame, FrameError> {
        codec::parse_fragment(fragment)
    }

    /// CONNECT frame: `accept-version` and `heart-beat` defaults, then `headers`
    pub fn connect(accept_version: &str, headers: &HeaderList) -> Frame {
        let defaults = crate::header_list![
            "accept-version" => accept_version,
            "heart-beat" => constants::HEART_BEAT_NONE
        ];
        Frame::with_parts(Command::Connect, defaults.with_overrides(headers), "")
    }

    /// SUBSCRIBE frame with automatic acknowledgement
    pub fn subscribe(subscription_id: &str, destination: &str) -> Frame {
        let headers = crate::header_list![
            "id" => subscription_id,
            "destination" => destination,
            "ack" => constants::ACK_AUTO
        ];
        Frame::with_parts(Command::Subscribe, headers, "")
    }

    /// UNSUBSCRIBE frame
    pub fn unsubscribe(subscription_id: &str) -> Frame {
        let headers = crate::header_list!["id" => subscription_id];
        Frame::with_parts(Command::Unsubscribe, headers, "")
    }

    /// SEND frame: `destination` and `content-type` defaults, then `headers`
    pub fn send(destination: &str, content_type: &str, body: &str, headers: &HeaderList) -> Frame {
        let defaults = crate::header_list![
            "destination" => destination,
            "content-type" => content_type
        ];
        Frame::with_parts(Command::Send, defaults.with_overrides(headers), body)
    }

    /// DISCONNECT frame
    pub fn disconnect() -> Frame {
        Frame::new(Command::Disconnect)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.command)?;
        for (key, value) in self.headers.iter() {
            writeln!(f, "{}:{}", key, value)?;
        }
        writeln!(f)?;
        f.write_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header_list;

    #[test]
    fn test_command_round_trip() {
        for command in [
            Command::Connect,
            Command::Connected,
            Command::Subscribe,
            Command::Unsubscribe,
            Command::Send,
            Command::Message,
            Command::Error,
            Command::Disconnect,
        ] {
            assert_eq!(command.as_str().parse::<Command>(), Ok(command));
        }
        assert_eq!(
            "RECEIPT".parse::<Command>(),
            Err(FrameError::UnknownCommand("RECEIPT".to_string()))
        );
        assert_eq!("".parse::<Command>(), Err(FrameError::Empty));
    }

    #[test]
    fn test_connect_frame_caller_headers_win() {
        let frame = Frame::connect(
            "1.2",
            &header_list![
                "Authorization" => "Bearer tok",
                "heart-beat" => "10000,10000"
            ],
        );
        assert_eq!(
            frame.encode(),
            "CONNECT\naccept-version:1.2\nheart-beat:10000,10000\nAuthorization:Bearer tok\n\n\0"
        );
    }

    #[test]
    fn test_subscribe_and_unsubscribe_frames() {
        assert_eq!(
            Frame::subscribe("sub-1", "/sub/7/messages").encode(),
            "SUBSCRIBE\nid:sub-1\ndestination:/sub/7/messages\nack:auto\n\n\0"
        );
        assert_eq!(
            Frame::unsubscribe("sub-1").encode(),
            "UNSUBSCRIBE\nid:sub-1\n\n\0"
        );
        assert_eq!(Frame::disconnect().encode(), "DISCONNECT\n\n\0");
    }

    #[test]
    fn test_send_frame_defaults() {
        let frame = Frame::send(
            "/pub/7/messages",
            "application/json",
            r#"{"content":"hi"}"#,
            &HeaderList::new(),
        );
        assert_eq!(
            frame.encode(),
            "SEND\ndestination:/pub/7/messages\ncontent-type:application/json\n\n{\"content\":\"hi\"}\0"
        );
        assert!(!frame.command.is_server_command());
    }

    #[test]
    fn test_display_omits_terminator() {
        let frame = Frame::with_parts(
            Command::Message,
            header_list!["subscription" => "sub-2"],
            "body",
        );
        assert_eq!(frame.to_string(), "MESSAGE\nsubscription:sub-2\n\nbody");
        assert!(frame.command.is_server_command());
    }
}
