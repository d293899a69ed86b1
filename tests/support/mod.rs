// Shared primitives for booting an isolated server per integration test.
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Binds an ephemeral port, serves a fresh world on it, and returns the
/// `host:port` address. Each test gets its own simulation so state never
/// leaks between tests.
pub async fn spawn_server() -> String {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        skirmish_server::run(listener).await.expect("server failed");
    });
    addr.to_string()
}

/// Connects a presentation client and completes the Join handshake,
/// consuming the Identity and initial Session messages.
pub async fn connect_client(addr: &str) -> WsClient {
    let (mut ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect presentation socket");

    let join = serde_json::json!({
        "type": "Join",
        "data": { "device_name": "test-device" }
    });
    ws.send(Message::Text(join.to_string().into()))
        .await
        .expect("send join");

    let identity = next_json(&mut ws).await;
    assert_eq!(identity["type"], "Identity");
    let session = next_json(&mut ws).await;
    assert_eq!(session["type"], "Session");

    ws
}

/// Connects a sync peer under the given display name.
pub async fn connect_peer(addr: &str, name: &str) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/peer?name={name}"))
        .await
        .expect("connect peer socket");
    ws
}

pub async fn send_json(ws: &mut WsClient, value: serde_json::Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send message");
}

/// Reads frames until the next text message and parses it as JSON.
pub async fn next_json(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for server message")
            .expect("socket closed")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("server sent invalid json");
        }
    }
}

/// Scans tick reports until one contains an event matching `predicate`.
pub async fn wait_for_event<F>(ws: &mut WsClient, mut predicate: F) -> serde_json::Value
where
    F: FnMut(&serde_json::Value) -> bool,
{
    // Bounded scan so a missing event fails the test instead of hanging.
    for _ in 0..600 {
        let msg = next_json(ws).await;
        if msg["type"] != "Tick" {
            continue;
        }
        if let Some(events) = msg["data"]["events"].as_array() {
            for event in events {
                if predicate(event) {
                    return event.clone();
                }
            }
        }
    }
    panic!("expected event did not arrive");
}
