//! STOMP client state machine
//!
//! [`StompClient`] owns a [`Transport`], drives the CONNECT/CONNECTED
//! handshake and routes inbound frames. It never reads from the socket
//! itself: whoever owns the transport's event stream feeds it back through
//! [`StompClient::handle_transport_event`].
//!
//! Frames issued before the handshake completes are queued and flushed in
//! FIFO order once CONNECTED arrives. A transport close discards the queue
//! and every subscription; callers re-subscribe after reconnecting.

use crate::config::ClientConfig;
use crate::event::{ClientEvent, ConnectFailure, EventListener};
use crate::observer::{FrameObserver, SentFrame};
use crate::registry::{Dispatch, SubscriptionRegistry};
use chatstomp_core::protocol::{constants, destinations};
use chatstomp_core::{
    decode, Command, Error, Frame, HeaderList, Result, Transport, TransportEvent,
};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::SystemTime;
use tokio::sync::mpsc::UnboundedReceiver;

type ConnectCallback = Box<dyn FnMut(&Frame) + Send>;
type ErrorCallback = Box<dyn FnMut(&ConnectFailure) + Send>;

/// Connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No transport is open
    #[default]
    Disconnected,
    /// The transport is opening or the handshake is in flight
    Connecting,
    /// The server accepted the handshake
    Connected,
    /// The server or the transport reported an error
    Error,
}

impl ConnectionStatus {
    /// Lowercase name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Socket {
    None,
    Opening,
    Open,
}

/// STOMP client over a text [`Transport`]
pub struct StompClient<T: Transport> {
    transport: T,
    config: ClientConfig,
    status: ConnectionStatus,
    socket: Socket,
    handshake_done: bool,
    pending: VecDeque<Frame>,
    registry: SubscriptionRegistry,
    next_subscription_id: u64,
    connect_headers: HeaderList,
    on_connect: Option<ConnectCallback>,
    on_error: Option<ErrorCallback>,
    listener: Option<Box<dyn EventListener>>,
    observer: Option<Box<dyn FrameObserver>>,
}

impl<T: Transport + fmt::Debug> fmt::Debug for StompClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StompClient")
            .field("transport", &self.transport)
            .field("url", &self.config.url)
            .field("status", &self.status)
            .field("socket", &self.socket)
            .field("pending", &self.pending.len())
            .field("registry", &self.registry)
            .finish()
    }
}

impl<T: Transport> StompClient<T> {
    /// Create a disconnected client
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            status: ConnectionStatus::Disconnected,
            socket: Socket::None,
            handshake_done: false,
            pending: VecDeque::new(),
            registry: SubscriptionRegistry::new(),
            next_subscription_id: 0,
            connect_headers: HeaderList::new(),
            on_connect: None,
            on_error: None,
            listener: None,
            observer: None,
        }
    }

    /// Report lifecycle events to `listener`
    pub fn with_listener(mut self, listener: impl EventListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Report every written frame to `observer`
    pub fn with_observer(mut self, observer: impl FrameObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Replace the event listener
    pub fn set_listener(&mut self, listener: impl EventListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Replace the frame observer
    pub fn set_observer(&mut self, observer: impl FrameObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Current status
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Check if the handshake completed and no error was reported since
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Number of frames waiting for the handshake
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Ids of the live subscriptions, sorted
    pub fn subscription_ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Open the transport and start the handshake
    ///
    /// Any existing connection is torn down first. The client is
    /// [`ConnectionStatus::Connecting`] when this returns; `headers` are
    /// written with CONNECT once the transport reports it is open, on top of
    /// the configured defaults. `on_connect` runs when CONNECTED arrives and
    /// `on_error` on an ERROR frame or a transport failure.
    pub fn connect<C, E>(&mut self, headers: HeaderList, on_connect: C, on_error: E) -> Result<()>
    where
        C: FnMut(&Frame) + Send + 'static,
        E: FnMut(&ConnectFailure) + Send + 'static,
    {
        self.config.validate()?;
        if self.socket != Socket::None {
            tracing::debug!("replacing existing connection");
            self.disconnect();
        }

        self.connect_headers = headers;
        self.on_connect = Some(Box::new(on_connect));
        self.on_error = Some(Box::new(on_error));
        self.status = ConnectionStatus::Connecting;
        self.socket = Socket::Opening;

        tracing::info!(url = %self.config.url, "opening STOMP connection");
        if let Err(e) = self.transport.open(&self.config.url) {
            tracing::warn!(url = %self.config.url, error = %e, "transport open failed");
            self.teardown();
            return Err(e);
        }
        Ok(())
    }

    /// Feed one transport event into the state machine
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => self.on_opened(),
            TransportEvent::Message(payload) => self.on_payload(&payload),
            TransportEvent::Error(reason) => self.on_transport_error(reason),
            TransportEvent::Closed => self.on_closed(),
        }
    }

    /// Drain `events` until a close has been processed or the channel ends
    pub async fn run_until_closed(&mut self, events: &mut UnboundedReceiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            let closed = event == TransportEvent::Closed;
            self.handle_transport_event(event);
            if closed {
                break;
            }
        }
    }

    /// Publish `body` to `destination`
    ///
    /// Queued until the handshake completes. Fails with
    /// [`Error::NotConnected`] only when no transport is open.
    pub fn send(&mut self, destination: &str, body: &str, headers: &HeaderList) -> Result<()> {
        self.ensure_socket()?;
        let frame = Frame::send(destination, &self.config.content_type, body, headers);
        self.transmit_or_queue(frame)
    }

    /// Serialise `payload` as JSON and publish it to `destination`
    pub fn send_json<S>(&mut self, destination: &str, payload: &S, headers: &HeaderList) -> Result<()>
    where
        S: Serialize + ?Sized,
    {
        let body = serde_json::to_string(payload)?;
        self.send(destination, &body, headers)
    }

    /// Mark a room as read
    pub fn send_read_receipt(&mut self, room_id: impl fmt::Display) -> Result<()> {
        self.send(&destinations::publish_read(room_id), "{}", &HeaderList::new())
    }

    /// Subscribe `callback` to `destination` and return the subscription id
    ///
    /// The callback is live as soon as this returns, even while SUBSCRIBE is
    /// still queued.
    pub fn subscribe<F>(&mut self, destination: &str, callback: F) -> Result<String>
    where
        F: FnMut(&str, &Frame) + Send + 'static,
    {
        self.ensure_socket()?;
        self.next_subscription_id += 1;
        let id = format!(
            "{}{}",
            constants::SUBSCRIPTION_ID_PREFIX,
            self.next_subscription_id
        );

        self.registry.register(id.clone(), Box::new(callback));
        if let Err(e) = self.transmit_or_queue(Frame::subscribe(&id, destination)) {
            self.registry.remove(&id);
            return Err(e);
        }
        tracing::debug!(subscription = %id, destination, "subscribed");
        Ok(id)
    }

    /// Drop a subscription; unknown ids are ignored
    pub fn unsubscribe(&mut self, id: &str) -> Result<()> {
        if !self.registry.remove(id) {
            tracing::debug!(subscription = id, "unsubscribe for unknown subscription ignored");
            return Ok(());
        }
        self.transmit_or_queue(Frame::unsubscribe(id))
    }

    /// Close the connection
    ///
    /// Writes DISCONNECT when connected; a failed write is logged, never
    /// returned. Safe to call in any state.
    pub fn disconnect(&mut self) {
        if self.socket == Socket::None {
            tracing::trace!("disconnect without open transport");
            return;
        }

        if self.status == ConnectionStatus::Connected && self.socket == Socket::Open {
            if let Err(e) = self.transmit(&Frame::disconnect()) {
                tracing::warn!(error = %e, "DISCONNECT could not be written");
            }
        }
        self.transport.close();
        self.teardown();
        tracing::info!("STOMP connection closed");
        self.emit(ClientEvent::Closed);
    }

    fn ensure_socket(&self) -> Result<()> {
        if self.status == ConnectionStatus::Disconnected {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    /// Queue `frame` before the handshake; afterwards write any backlog
    /// first, then `frame`. A backlog that still fails to write keeps
    /// `frame` queued behind it and is reported as a transport error.
    fn transmit_or_queue(&mut self, frame: Frame) -> Result<()> {
        if !self.handshake_done || self.socket != Socket::Open {
            tracing::trace!(command = %frame.command, "queueing frame until connected");
            self.pending.push_back(frame);
            return Ok(());
        }

        if let Err(e) = self.flush_pending() {
            self.pending.push_back(frame);
            self.on_transport_error(e.to_string());
            return Ok(());
        }
        self.transmit(&frame)
    }

    fn transmit(&mut self, frame: &Frame) -> Result<()> {
        let raw = frame.encode();
        self.transport.send(&raw)?;

        #[cfg(feature = "metrics")]
        metrics::counter!("chatstomp_client_frames_sent_total").increment(1);

        tracing::trace!(command = %frame.command, "frame sent");
        if let Some(observer) = self.observer.as_mut() {
            let sent = SentFrame {
                command: frame.command,
                headers: frame.headers.clone(),
                body: frame.body.clone(),
                raw,
                timestamp: SystemTime::now(),
            };
            if panic::catch_unwind(AssertUnwindSafe(|| observer.on_frame(&sent))).is_err() {
                tracing::warn!(command = %frame.command, "frame observer panicked");
            }
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            tracing::debug!(count = self.pending.len(), "flushing queued frames");
        }
        while let Some(frame) = self.pending.pop_front() {
            if let Err(e) = self.transmit(&frame) {
                self.pending.push_front(frame);
                return Err(e);
            }
        }
        Ok(())
    }

    fn on_opened(&mut self) {
        if self.socket != Socket::Opening {
            tracing::debug!(socket = ?self.socket, "unexpected open event ignored");
            return;
        }
        self.socket = Socket::Open;

        let headers = self.config.headers.clone().with_overrides(&self.connect_headers);
        let frame = Frame::connect(&self.config.accept_version, &headers);
        if let Err(e) = self.transmit(&frame) {
            self.on_transport_error(e.to_string());
            return;
        }
        self.emit(ClientEvent::Opened);
    }

    fn on_payload(&mut self, payload: &str) {
        if self.socket == Socket::None {
            tracing::debug!("payload after close ignored");
            return;
        }
        for frame in decode(payload) {
            #[cfg(feature = "metrics")]
            metrics::counter!("chatstomp_client_frames_received_total").increment(1);

            match frame.command {
                Command::Connected => self.on_connected(frame),
                Command::Message => self.on_message(frame),
                Command::Error => self.on_error_frame(frame),
                other => tracing::debug!(command = %other, "unexpected server frame ignored"),
            }
        }
    }

    fn on_connected(&mut self, frame: Frame) {
        self.status = ConnectionStatus::Connected;
        self.handshake_done = true;
        tracing::info!(version = frame.headers.version(), "STOMP session established");

        if let Err(e) = self.flush_pending() {
            self.on_transport_error(e.to_string());
            return;
        }
        if let Some(callback) = self.on_connect.as_mut() {
            callback(&frame);
        }
        self.emit(ClientEvent::Connected(frame));
    }

    fn on_message(&mut self, frame: Frame) {
        match self.registry.dispatch(&frame) {
            Dispatch::Delivered(subscription) => {
                self.emit(ClientEvent::MessageDelivered { subscription, frame });
            }
            Dispatch::MissingSubscription | Dispatch::Unrouted(_) => {
                #[cfg(feature = "metrics")]
                metrics::counter!("chatstomp_client_messages_dropped_total").increment(1);
            }
        }
    }

    fn on_error_frame(&mut self, frame: Frame) {
        self.status = ConnectionStatus::Error;
        tracing::warn!(
            message = frame.headers.message().unwrap_or_default(),
            "server reported an error"
        );
        let failure = ConnectFailure::ErrorFrame(frame.clone());
        if let Some(callback) = self.on_error.as_mut() {
            callback(&failure);
        }
        self.emit(ClientEvent::ErrorFrame(frame));
    }

    fn on_transport_error(&mut self, reason: String) {
        if self.socket == Socket::None {
            tracing::debug!(%reason, "transport error after close ignored");
            return;
        }
        self.status = ConnectionStatus::Error;
        tracing::warn!(%reason, "transport error");
        let failure = ConnectFailure::Transport(reason.clone());
        if let Some(callback) = self.on_error.as_mut() {
            callback(&failure);
        }
        self.emit(ClientEvent::TransportError(reason));
    }

    fn on_closed(&mut self) {
        if self.socket == Socket::None {
            tracing::debug!("close event for a torn down connection ignored");
            return;
        }
        tracing::info!("transport closed");
        self.teardown();
        self.emit(ClientEvent::Closed);
    }

    fn teardown(&mut self) {
        if !self.pending.is_empty() {
            tracing::warn!(count = self.pending.len(), "discarding queued frames");
        }
        self.status = ConnectionStatus::Disconnected;
        self.socket = Socket::None;
        self.handshake_done = false;
        self.pending.clear();
        self.registry.clear();
        self.on_connect = None;
        self.on_error = None;
    }

    fn emit(&mut self, event: ClientEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_event(&event);
        }
    }
}

impl<T: Transport> Drop for StompClient<T> {
    fn drop(&mut self) {
        if self.socket != Socket::None {
            self.transport.close();
        }
    }
}
