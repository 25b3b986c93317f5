use chatstomp_transport_ws::prelude::*;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn ws_transport_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let first = ws.next().await.unwrap().unwrap();
        let reply = format!("echo:{}", first.to_text().unwrap());
        ws.send(Message::text(reply)).await.unwrap();
        ws.send(Message::binary(b"raw".to_vec())).await.unwrap();
        ws.close(None).await.unwrap();
    });

    let (mut transport, mut events) = WsTransport::channel();
    transport.open(&format!("ws://{addr}/stomp")).unwrap();
    assert_eq!(events.recv().await, Some(TransportEvent::Opened));
    assert!(transport.is_open());

    transport.send("hello").unwrap();
    assert_eq!(
        events.recv().await,
        Some(TransportEvent::Message("echo:hello".to_string()))
    );
    assert_eq!(
        events.recv().await,
        Some(TransportEvent::Message("raw".to_string()))
    );
    assert_eq!(events.recv().await, Some(TransportEvent::Closed));

    server.await.unwrap();
}

#[tokio::test]
async fn ws_transport_is_silent_after_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
        }
    });

    let (mut transport, mut events) = WsTransport::channel();
    transport.open(&format!("ws://{addr}/stomp")).unwrap();
    assert_eq!(events.recv().await, Some(TransportEvent::Opened));

    transport.close();
    assert!(!transport.is_open());
    let next = tokio::time::timeout(Duration::from_millis(200), events.recv()).await;
    assert!(next.is_err(), "unexpected event after close: {next:?}");

    server.await.unwrap();
}
