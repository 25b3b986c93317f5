//! STOMP text wire codec
//!
//! Frames travel as `COMMAND\n`, zero or more `key:value\n` lines, a blank
//! line, the body and a single NUL terminator. A transport delivery may hold
//! several frames back to back, and servers may interleave empty heartbeat
//! fragments between them.

use crate::error::FrameError;
use crate::frame::{Command, Frame};
use crate::header::HeaderList;
use tracing::{debug, trace};

/// Frame terminator
pub const FRAME_TERMINATOR: char = '\0';

/// Separator between the header section and the body
const BODY_SEPARATOR: &str = "\n\n";

/// Encode a frame from its parts
///
/// Headers are written in list order; suppressed entries are skipped.
pub fn encode(command: Command, headers: &HeaderList, body: &str) -> String {
    let headers_len: usize = headers.iter().map(|(k, v)| k.len() + v.len() + 2).sum();
    let mut out = String::with_capacity(command.as_str().len() + headers_len + body.len() + 3);

    out.push_str(command.as_str());
    out.push('\n');
    for (key, value) in headers.iter() {
        out.push_str(key);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(body);
    out.push(FRAME_TERMINATOR);
    out
}

/// Decode every frame in a transport payload, in delivery order
///
/// Empty and all-whitespace fragments (heartbeats) are ignored. Fragments
/// that do not parse are logged and skipped without affecting the rest of
/// the payload.
pub fn decode(raw: &str) -> Vec<Frame> {
    raw.split(FRAME_TERMINATOR)
        .map(str::trim_start)
        .filter(|fragment| !fragment.is_empty())
        .filter_map(|fragment| match parse_fragment(fragment) {
            Ok(frame) => Some(frame),
            Err(err) => {
                debug!(error = %err, "dropping undecodable frame fragment");
                trace!(fragment, "undecodable fragment");
                None
            }
        })
        .collect()
}

/// Parse a single fragment with the terminator already removed
///
/// The header section ends at the first blank line; everything after it is
/// the body, including any further blank lines. Header lines split at their
/// first colon, so values may contain colons. Lines without a colon are
/// ignored and a repeated key keeps its first position with the last value.
pub(crate) fn parse_fragment(fragment: &str) -> Result<Frame, FrameError> {
    let fragment = fragment.trim_start();
    let (header_section, body) = fragment
        .split_once(BODY_SEPARATOR)
        .unwrap_or((fragment, ""));

    let mut lines = header_section.split('\n');
    let command = lines.next().unwrap_or_default().parse::<Command>()?;

    let mut headers = HeaderList::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            headers.set(key, value);
        }
    }

    Ok(Frame::with_parts(command, headers, body))
}
