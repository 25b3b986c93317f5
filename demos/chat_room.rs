//! Joins a chat room, prints every message in id order and posts one line.
//!
//! ```text
//! CHATSTOMP_BACKEND_URL=http://localhost:8080 CHATSTOMP_TOKEN=... \
//!     cargo run --example chat_room -- 7 "hello"
//! ```

use chatstomp::prelude::*;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    chatstomp::logging::init_logging()?;

    let mut args = std::env::args().skip(1);
    let room: u64 = args.next().unwrap_or_else(|| "1".to_string()).parse()?;
    let text = args.next().unwrap_or_else(|| "hello from chatstomp".to_string());

    let tokens = MemoryTokenStore::new();
    if let Ok(token) = std::env::var("CHATSTOMP_TOKEN") {
        tokens.set(chatstomp::client::token_store::ACCESS_TOKEN_KEY, &token);
    }
    let mut headers = HeaderList::new();
    if let Some(token) = tokens.access_token() {
        headers.set(constants::AUTHORIZATION, bearer(&token));
    }

    let (transport, mut events) = WsTransport::channel();
    let frames = FrameLog::new();
    let mut client = StompClient::new(transport, ClientConfig::from_env())
        .with_observer(frames.clone())
        .with_listener(|event: &ClientEvent| tracing::debug!(?event, "client event"));

    client.connect(
        headers,
        |frame| tracing::info!(version = frame.headers.version(), "connected"),
        |failure| tracing::error!(reason = failure.message(), "connection failed"),
    )?;

    let messages = Arc::new(Mutex::new(MessageList::<Value>::new()));
    let sink = messages.clone();
    client.subscribe(&destinations::room_messages(room), move |body, _| {
        match serde_json::from_str::<Value>(body) {
            Ok(message) => {
                let mut messages = sink.lock().unwrap_or_else(|e| e.into_inner());
                messages.push(message);
                for message in messages.as_slice() {
                    println!("{} {}", message["id"], message["content"]);
                }
            }
            Err(e) => tracing::warn!(error = %e, "undecodable chat message"),
        }
    })?;
    client.subscribe(destinations::USER_ERRORS, |body, _| {
        tracing::warn!(body, "server rejected a request")
    })?;

    client.send_json(
        &destinations::publish_messages(room),
        &json!({ "content": text }),
        &HeaderList::new(),
    )?;
    client.send_read_receipt(room)?;

    let interrupted = tokio::select! {
        _ = client.run_until_closed(&mut events) => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        client.disconnect();
    }

    tracing::info!(frames = frames.len(), "session finished");
    Ok(())
}
