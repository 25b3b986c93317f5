//! WebSocket transport implementation for ChatStomp
//!
//! Each `open` spawns a socket task on the current tokio runtime. The task
//! forwards what it sees as [`TransportEvent`]s over an unbounded channel and
//! writes the payloads queued by [`Transport::send`]. Opens and closes bump a
//! generation counter; a task whose generation is stale stays silent, so no
//! event for a connection is delivered once `close` has returned.

use chatstomp_core::{Error, Result, Transport, TransportEvent};
use futures_util::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// Event sender bound to one connection generation
#[derive(Debug, Clone)]
struct EventSink {
    events: UnboundedSender<TransportEvent>,
    current: Arc<Mutex<u64>>,
    generation: u64,
}

impl EventSink {
    fn emit(&self, event: TransportEvent) {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != self.generation {
            trace!(?event, "dropping event from stale connection");
            return;
        }
        if self.events.send(event).is_err() {
            trace!("transport event receiver dropped");
        }
    }
}

/// WebSocket [`Transport`] backed by tokio-tungstenite
#[derive(Debug)]
pub struct WsTransport {
    events: UnboundedSender<TransportEvent>,
    outbound: Option<UnboundedSender<Outbound>>,
    generation: Arc<Mutex<u64>>,
}

impl WsTransport {
    /// Create a transport and the receiver its events arrive on
    pub fn channel() -> (Self, UnboundedReceiver<TransportEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let transport = Self {
            events,
            outbound: None,
            generation: Arc::new(Mutex::new(0)),
        };
        (transport, receiver)
    }

    /// Check if a socket task is attached
    pub fn is_open(&self) -> bool {
        self.outbound
            .as_ref()
            .is_some_and(|outbound| !outbound.is_closed())
    }

    fn next_generation(&self) -> u64 {
        let mut current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        *current
    }
}

impl Transport for WsTransport {
    fn open(&mut self, url: &str) -> Result<()> {
        let handle = Handle::try_current()
            .map_err(|e| Error::transport(format!("no tokio runtime to drive {url}: {e}")))?;

        self.close();
        let (outbound, commands) = mpsc::unbounded_channel();
        let sink = EventSink {
            events: self.events.clone(),
            current: self.generation.clone(),
            generation: self.next_generation(),
        };
        self.outbound = Some(outbound);

        debug!(url, generation = sink.generation, "spawning websocket task");
        handle.spawn(run_socket(url.to_string(), commands, sink));
        Ok(())
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        let outbound = self
            .outbound
            .as_ref()
            .ok_or_else(|| Error::transport("websocket is not open"))?;
        outbound
            .send(Outbound::Text(payload.to_string()))
            .map_err(|_| Error::transport("websocket task has ended"))
    }

    fn close(&mut self) {
        if let Some(outbound) = self.outbound.take() {
            self.next_generation();
            let _ = outbound.send(Outbound::Close);
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_socket(url: String, mut commands: UnboundedReceiver<Outbound>, sink: EventSink) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(%url, error = %e, "websocket connect failed");
            sink.emit(TransportEvent::Error(e.to_string()));
            sink.emit(TransportEvent::Closed);
            return;
        }
    };

    debug!(%url, "websocket open");
    sink.emit(TransportEvent::Opened);
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Outbound::Text(payload)) => {
                    if let Err(e) = write.send(Message::text(payload)).await {
                        sink.emit(TransportEvent::Error(e.to_string()));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    if let Err(e) = write.close().await {
                        debug!(error = %e, "websocket close handshake failed");
                    }
                    return;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    sink.emit(TransportEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    sink.emit(TransportEvent::Message(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "websocket closed by peer");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "websocket read failed");
                    sink.emit(TransportEvent::Error(e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    sink.emit(TransportEvent::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_without_runtime_fails() {
        let (mut transport, _events) = WsTransport::channel();
        assert!(matches!(
            transport.open("ws://127.0.0.1:1/stomp"),
            Err(Error::Transport(_))
        ));
        assert!(!transport.is_open());
    }

    #[test]
    fn test_send_before_open_fails() {
        let (mut transport, _events) = WsTransport::channel();
        assert!(transport.send("SEND\n\n\0").is_err());
        transport.close();
    }

    #[test]
    fn test_stale_generation_is_silent() {
        let (events, mut receiver) = mpsc::unbounded_channel();
        let current = Arc::new(Mutex::new(2));
        let stale = EventSink {
            events: events.clone(),
            current: current.clone(),
            generation: 1,
        };
        let live = EventSink {
            events,
            current,
            generation: 2,
        };

        stale.emit(TransportEvent::Opened);
        live.emit(TransportEvent::Closed);
        assert_eq!(receiver.try_recv().unwrap(), TransportEvent::Closed);
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_connect_failure_reports_error_then_closed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (mut transport, mut events) = WsTransport::channel();
        transport.open(&format!("ws://{addr}/stomp")).unwrap();
        assert!(matches!(events.recv().await, Some(TransportEvent::Error(_))));
        assert_eq!(events.recv().await, Some(TransportEvent::Closed));
    }
}
