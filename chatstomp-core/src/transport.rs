//! Transport layer abstraction
//!
//! The STOMP client never touches sockets directly. It asks a [`Transport`]
//! to open, write and close, and the owner of the client feeds whatever the
//! socket reports back in as [`TransportEvent`]s. This keeps the state
//! machine single-threaded and lets tests replay raw payloads without a
//! network.

use crate::error::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Something a transport observed on its socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The socket finished opening
    Opened,
    /// A text payload arrived; it may hold several frames
    Message(String),
    /// The socket failed
    Error(String),
    /// The socket closed
    Closed,
}

/// Outbound half of a text transport
///
/// Implementations must not deliver further events for a connection once
/// [`Transport::close`] has returned.
pub trait Transport {
    /// Begin opening a connection to `url`; completion arrives as
    /// [`TransportEvent::Opened`]
    fn open(&mut self, url: &str) -> Result<()>;

    /// Write one text payload to the open socket
    fn send(&mut self, payload: &str) -> Result<()>;

    /// Close the socket, if any
    fn close(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self, url: &str) -> Result<()> {
        (**self).open(url)
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        (**self).send(payload)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// What a [`RecordingTransport`] has seen so far
#[derive(Debug, Default, Clone)]
pub struct Recording {
    /// URLs passed to `open`, in order
    pub opened: Vec<String>,
    /// Payloads passed to `send`, in order
    pub sent: Vec<String>,
    /// Number of `close` calls
    pub closes: usize,
    /// Make `send` fail
    pub fail_sends: bool,
    /// Make `open` fail
    pub fail_open: bool,
}

/// In-memory transport that records everything written to it
///
/// Clones share the same recording, so a test can hand one clone to the
/// client and inspect the other.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    state: Arc<Mutex<Recording>>,
}

impl RecordingTransport {
    /// Create a new recording transport
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, Recording> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the recording
    pub fn recording(&self) -> Recording {
        self.state().clone()
    }

    /// Payloads written so far
    pub fn sent(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    /// Commands of the frames written so far, one per payload
    pub fn sent_commands(&self) -> Vec<String> {
        self.state()
            .sent
            .iter()
            .map(|raw| raw.split('\n').next().unwrap_or_default().to_string())
            .collect()
    }

    /// Forget written payloads
    pub fn clear_sent(&self) {
        self.state().sent.clear();
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn fail_sends(&self, fail: bool) {
        self.state().fail_sends = fail;
    }

    /// Make subsequent opens fail (or succeed again)
    pub fn fail_open(&self, fail: bool) {
        self.state().fail_open = fail;
    }
}

impl Transport for RecordingTransport {
    fn open(&mut self, url: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_open {
            return Err(Error::transport(format!("cannot open {url}")));
        }
        state.opened.push(url.to_string());
        Ok(())
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_sends {
            return Err(Error::transport("write failed"));
        }
        state.sent.push(payload.to_string());
        Ok(())
    }

    fn close(&mut self) {
        self.state().closes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_transport_shares_state() {
        let handle = RecordingTransport::new();
        let mut transport = handle.clone();

        transport.open("ws://localhost:8080/stomp").unwrap();
        transport.send("CONNECT\n\n\0").unwrap();
        transport.close();

        let recording = handle.recording();
        assert_eq!(recording.opened, vec!["ws://localhost:8080/stomp"]);
        assert_eq!(handle.sent_commands(), vec!["CONNECT"]);
        assert_eq!(recording.closes, 1);
    }

    #[test]
    fn test_recording_transport_failures() {
        let handle = RecordingTransport::new();
        let mut transport: Box<dyn Transport> = Box::new(handle.clone());

        handle.fail_open(true);
        assert!(matches!(transport.open("ws://x"), Err(Error::Transport(_))));

        handle.fail_sends(true);
        assert!(transport.send("SEND\n\n\0").is_err());
        handle.fail_sends(false);
        transport.send("SEND\n\n\0").unwrap();
        assert_eq!(handle.sent().len(), 1);

        handle.clear_sent();
        assert!(handle.sent().is_empty());
    }
}
