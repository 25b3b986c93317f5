#![cfg(all(feature = "client", feature = "transport-ws"))]

use chatstomp::prelude::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Accepts one client and answers like a minimal STOMP broker
async fn run_broker(listener: TcpListener) -> Vec<Frame> {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = accept_async(stream).await.unwrap();
    let mut received = Vec::new();

    while let Some(Ok(message)) = ws.next().await {
        if message.is_close() {
            break;
        }
        let text = message.to_text().unwrap().to_string();
        for frame in decode(&text) {
            match frame.command {
                Command::Connect => {
                    let reply = "CONNECTED\nversion:1.2\n\n\0\n".to_string();
                    ws.send(Message::text(reply)).await.unwrap();
                }
                Command::Subscribe => {
                    let id = frame.headers.id().unwrap();
                    let reply = format!(
                        "MESSAGE\ndestination:/sub/7/messages\nsubscription:{id}\nmessage-id:m-1\n\n{}\0",
                        json!({"id": 1, "content": "welcome"})
                    );
                    ws.send(Message::text(reply)).await.unwrap();
                }
                _ => {}
            }
            received.push(frame);
        }
    }
    received
}

#[tokio::test]
async fn client_talks_to_websocket_broker() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let broker = tokio::spawn(run_broker(listener));

    let (transport, mut transport_events) = WsTransport::channel();
    let (listener_tx, mut client_events) = tokio::sync::mpsc::unbounded_channel();
    let mut client = StompClient::new(transport, ClientConfig::new(format!("ws://{addr}/stomp")))
        .with_listener(listener_tx);

    client
        .connect(header_list!["Authorization" => bearer("tok")], |_| {}, |_| {})
        .unwrap();

    let messages = Arc::new(Mutex::new(MessageList::<Value>::new()));
    let sink = messages.clone();
    client
        .subscribe(&destinations::room_messages(7), move |body, _| {
            sink.lock().unwrap().push(serde_json::from_str(body).unwrap());
        })
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while messages.lock().unwrap().is_empty() {
            let event = transport_events.recv().await.unwrap();
            client.handle_transport_event(event);
        }
    })
    .await
    .expect("no delivery from broker");

    assert!(client.is_connected());
    client.send_read_receipt(7).unwrap();
    client.disconnect();

    let received = tokio::time::timeout(Duration::from_secs(5), broker)
        .await
        .unwrap()
        .unwrap();
    let commands: Vec<Command> = received.iter().map(|f| f.command).collect();
    assert_eq!(
        commands,
        vec![
            Command::Connect,
            Command::Subscribe,
            Command::Send,
            Command::Disconnect
        ]
    );
    assert_eq!(received[0].headers.get("Authorization"), Some("Bearer tok"));
    assert_eq!(received[2].headers.destination(), Some("/pub/7/read"));

    let mut seen = Vec::new();
    while let Ok(event) = client_events.try_recv() {
        seen.push(event);
    }
    assert_eq!(seen.first(), Some(&ClientEvent::Opened));
    assert!(matches!(seen[1], ClientEvent::Connected(_)));
    assert!(matches!(seen[2], ClientEvent::MessageDelivered { .. }));
    assert_eq!(seen.last(), Some(&ClientEvent::Closed));
    assert_eq!(messages.lock().unwrap().as_slice()[0]["content"], "welcome");
}
