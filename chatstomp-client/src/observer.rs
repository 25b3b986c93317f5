//! Outbound frame observation
//!
//! Every frame the client writes to its transport is reported to an
//! optional [`FrameObserver`]. Observers are diagnostics only: a panicking
//! observer is caught and logged, and the frame still counts as sent.

use chatstomp_core::{Command, HeaderList};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

/// Default capacity of a [`FrameLog`]
pub const DEFAULT_FRAME_LOG_CAPACITY: usize = 100;

/// A frame as written to the transport
#[derive(Debug, Clone, PartialEq)]
pub struct SentFrame {
    /// Frame command
    pub command: Command,
    /// Headers in wire order
    pub headers: HeaderList,
    /// Frame body
    pub body: String,
    /// Exact payload handed to the transport
    pub raw: String,
    /// When the payload was written
    pub timestamp: SystemTime,
}

/// Receiver of sent frames
pub trait FrameObserver: Send {
    /// Called after a frame has been written
    fn on_frame(&mut self, frame: &SentFrame);
}

impl<F> FrameObserver for F
where
    F: FnMut(&SentFrame) + Send,
{
    fn on_frame(&mut self, frame: &SentFrame) {
        self(frame)
    }
}

/// One [`FrameLog`] entry
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLogEntry {
    /// Sequential id, `frame-1`, `frame-2`, ...
    pub id: String,
    /// The recorded frame
    pub frame: SentFrame,
}

#[derive(Debug, Default)]
struct FrameLogInner {
    entries: VecDeque<FrameLogEntry>,
    next_id: u64,
}

/// Bounded log of sent frames, newest first
///
/// Clones share the same log, so one clone can be installed as the
/// client's observer while another is read from a diagnostics view.
#[derive(Clone)]
pub struct FrameLog {
    inner: Arc<Mutex<FrameLogInner>>,
    capacity: usize,
}

impl Default for FrameLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FRAME_LOG_CAPACITY)
    }
}

impl fmt::Debug for FrameLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLog")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl FrameLog {
    /// Create a log holding the default number of entries
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log holding at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FrameLogInner::default())),
            capacity,
        }
    }

    fn inner(&self) -> MutexGuard<'_, FrameLogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a frame
    pub fn record(&self, frame: &SentFrame) {
        let mut inner = self.inner();
        inner.next_id += 1;
        let entry = FrameLogEntry {
            id: format!("frame-{}", inner.next_id),
            frame: frame.clone(),
        };
        inner.entries.push_front(entry);
        inner.entries.truncate(self.capacity);
    }

    /// Snapshot of the entries, newest first
    pub fn entries(&self) -> Vec<FrameLogEntry> {
        self.inner().entries.iter().cloned().collect()
    }

    /// Drop every entry; ids keep counting
    pub fn clear(&self) {
        self.inner().entries.clear();
    }

    /// Number of entries held
    pub fn len(&self) -> usize {
        self.inner().entries.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries held
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl FrameObserver for FrameLog {
    fn on_frame(&mut self, frame: &SentFrame) {
        self.record(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatstomp_core::Frame;

    fn sent(command: Command) -> SentFrame {
        let frame = Frame::new(command);
        SentFrame {
            command,
            headers: frame.headers.clone(),
            body: frame.body.clone(),
            raw: frame.encode(),
            timestamp: SystemTime::now(),
        }
    }

    #[test]
    fn test_frame_log_newest_first() {
        let log = FrameLog::new();
        let mut observer = log.clone();
        observer.on_frame(&sent(Command::Connect));
        observer.on_frame(&sent(Command::Subscribe));

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "frame-2");
        assert_eq!(entries[0].frame.command, Command::Subscribe);
        assert_eq!(entries[1].id, "frame-1");
        assert_eq!(entries[1].frame.raw, "CONNECT\n\n\0");
    }

    #[test]
    fn test_frame_log_is_bounded() {
        let log = FrameLog::with_capacity(3);
        for _ in 0..5 {
            log.record(&sent(Command::Send));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[0].id, "frame-5");
        assert_eq!(log.entries()[2].id, "frame-3");

        log.clear();
        assert!(log.is_empty());
        log.record(&sent(Command::Send));
        assert_eq!(log.entries()[0].id, "frame-6");
    }
}
