//! Facade tests over a local WebSocket server

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use futures_util::{SinkExt, StreamExt};
use gemini_sdk::prelude::*;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

fn gemini() -> Gemini {
    let creds = Credentials::new("test-api-key", "test-api-secret").unwrap();
    Gemini::new(creds, Mode::Sandbox).unwrap()
}

/// Accept one client, report (path, payload header), send one heartbeat
async fn serve_one(listener: TcpListener, seen: mpsc::UnboundedSender<(String, String)>) {
    let (stream, _) = listener.accept().await.unwrap();
    let seen_hdr = seen.clone();
    let mut ws = tokio_tungstenite::accept_hdr_async(stream, move |req: &Request, resp: Response| {
        let payload = req
            .headers()
            .get("x-gemini-payload")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let _ = seen_hdr.send((req.uri().path().to_string(), payload));
        Ok::<Response, ErrorResponse>(resp)
    })
    .await
    .unwrap();

    ws.send(Message::Text(r#"{"type":"heartbeat","timestampms":1}"#.to_string()))
        .await
        .unwrap();
    while let Some(Ok(_)) = ws.next().await {}
}

#[tokio::test]
async fn test_socket_signs_with_shared_credentials() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("ws://{}", listener.local_addr().unwrap());
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(serve_one(listener, seen_tx));

    let gemini = gemini();
    let before = gemini.api().credentials().next_nonce();

    let heartbeats = Arc::new(AtomicUsize::new(0));
    let counter = heartbeats.clone();
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();

    let socket = gemini
        .socket(ORDER_EVENTS_PATH)
        .base_url(base_url)
        .on_heartbeat(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .connect(move |frame| {
            let _ = frame_tx.send(frame.to_string());
        })
        .unwrap();

    let (path, payload) = timeout(Duration::from_secs(5), seen_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(path, "/v1/order/events");

    let payload: Value = serde_json::from_slice(&BASE64.decode(payload).unwrap()).unwrap();
    assert_eq!(payload["request"], "/v1/order/events");
    assert!(payload["nonce"].as_u64().unwrap() > before);

    let frame = timeout(Duration::from_secs(5), frame_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(frame.contains("heartbeat"));
    assert_eq!(heartbeats.load(Ordering::SeqCst), 1);

    socket.close().await;
}

#[tokio::test]
async fn test_close_fires_close_hook_once() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("ws://{}", listener.local_addr().unwrap());
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(serve_one(listener, seen_tx));

    let closes = Arc::new(AtomicUsize::new(0));
    let counter = closes.clone();
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();

    let socket = gemini()
        .socket(format!("{}/BTCUSD", MARKET_DATA_PATH))
        .base_url(base_url)
        .on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .connect(move |frame| {
            let _ = frame_tx.send(frame.to_string());
        })
        .unwrap();

    timeout(Duration::from_secs(5), seen_rx.recv()).await.unwrap().unwrap();
    timeout(Duration::from_secs(5), frame_rx.recv()).await.unwrap().unwrap();
    assert!(socket.is_open());

    socket.close().await;
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}
