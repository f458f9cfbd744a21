//! End-to-end tests for the realtime connection against a local echo
//! server that mimics the public endpoint (greeting banner first, then
//! every text frame reflected back on the same connection).

#![cfg(not(target_arch = "wasm32"))]

use std::time::Duration;

use futures_channel::mpsc::{self, UnboundedReceiver};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use shopdash_client::ws::{ConnectionState, FanoutChannel, ReconnectConfig, WsConnection};
use shopdash_shared::{Product, RealtimeEvent};

fn product() -> Product {
    Product {
        id: 1_700_000_000_000,
        title: "Echo Test Product".to_string(),
        description: "Testing echo functionality".to_string(),
        price: 123.45,
        category: "beauty".to_string(),
        rating: Some(4.5),
        stock: Some(12),
        discount_percentage: None,
        brand: None,
        thumbnail: None,
        images: None,
    }
}

/// Echo server on an ephemeral port. When `noisy` is set, each
/// connection is fed a malformed frame and a plain-text frame right
/// after the greeting, before any echoing starts.
async fn spawn_echo_server(noisy: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut ws = accept_async(stream).await.unwrap();
                ws.send(Message::Text("Request served by test-node".into()))
                    .await
                    .unwrap();
                if noisy {
                    ws.send(Message::Text("{\"event\": \"new_product\"".into()))
                        .await
                        .unwrap();
                    ws.send(Message::Text("hello there".into())).await.unwrap();
                }
                while let Some(Ok(msg)) = ws.next().await {
                    if let Message::Text(text) = msg {
                        if ws.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                }
            });
        }
    });
    format!("ws://{addr}")
}

async fn recv<T>(rx: &mut UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.next())
        .await
        .expect("timed out waiting for channel")
        .expect("channel closed")
}

async fn wait_for_state(
    rx: &mut UnboundedReceiver<ConnectionState>,
    wanted: impl Fn(&ConnectionState) -> bool,
) -> ConnectionState {
    loop {
        let state = recv(rx).await;
        if wanted(&state) {
            return state;
        }
    }
}

fn connect(
    url: &str,
    config: ReconnectConfig,
) -> (
    WsConnection,
    UnboundedReceiver<RealtimeEvent>,
    UnboundedReceiver<ConnectionState>,
) {
    let (event_tx, event_rx) = mpsc::unbounded();
    let (state_tx, state_rx) = mpsc::unbounded();
    let connection = WsConnection::new(
        url,
        FanoutChannel::open(|_| {}),
        move |event| {
            let _ = event_tx.unbounded_send(event);
        },
        move |state| {
            let _ = state_tx.unbounded_send(state);
        },
        config,
    );
    (connection, event_rx, state_rx)
}

#[tokio::test]
async fn product_survives_the_round_trip() {
    let url = spawn_echo_server(false).await;
    let (connection, mut events, mut states) = connect(&url, ReconnectConfig::default());

    wait_for_state(&mut states, |s| s.is_connected()).await;

    let sent = product();
    connection
        .handle()
        .send(RealtimeEvent::new_product(sent.clone()))
        .unwrap();

    // The greeting banner is swallowed, so the first delivered event is
    // the echoed product, field for field.
    let received = recv(&mut events).await;
    assert!(received.is_new_product());
    assert_eq!(received.product, Some(sent.clone()));

    // Feeding the echo into the catalog, then the fan-out copy of the
    // same product, leaves exactly one entry.
    let mut catalog = shopdash_shared::CatalogState::default();
    assert!(catalog.add_product(received.product.unwrap()));
    assert!(!catalog.add_product(sent));
    assert_eq!(catalog.products.len(), 1);
    assert_eq!(catalog.total, 1);

    connection.disconnect();
}

#[tokio::test]
async fn noise_frames_do_not_break_the_session() {
    let url = spawn_echo_server(true).await;
    let (connection, mut events, mut states) = connect(&url, ReconnectConfig::default());

    wait_for_state(&mut states, |s| s.is_connected()).await;

    // The malformed frame is dropped; the plain-text frame arrives as a
    // text event.
    let first = recv(&mut events).await;
    assert_eq!(first.event, "text");
    assert_eq!(first.data.as_deref(), Some("hello there"));

    // The session is still healthy afterwards.
    connection
        .handle()
        .send(RealtimeEvent::new_product(product()))
        .unwrap();
    let second = recv(&mut events).await;
    assert_eq!(second.product, Some(product()));

    connection.disconnect();
}

#[tokio::test]
async fn frames_queued_while_connecting_are_flushed() {
    let url = spawn_echo_server(false).await;
    let (connection, mut events, _states) = connect(&url, ReconnectConfig::default());

    // Send before the handshake has finished; the frame sits in the
    // queue until the session starts draining it.
    connection
        .handle()
        .send(RealtimeEvent::new_product(product()))
        .unwrap();

    let received = recv(&mut events).await;
    assert_eq!(received.product, Some(product()));

    connection.disconnect();
}

#[tokio::test]
async fn retry_cap_parks_until_asked_to_resume() {
    // Grab a port nobody is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ReconnectConfig {
        max_attempts: 2,
        initial_delay_ms: 10,
        max_delay_ms: 50,
        backoff_multiplier: 1.5,
    };
    let (connection, _events, mut states) = connect(&format!("ws://{addr}"), config);

    assert_eq!(recv(&mut states).await, ConnectionState::Connecting);
    assert_eq!(
        recv(&mut states).await,
        ConnectionState::Reconnecting { attempt: 1 }
    );
    assert_eq!(
        recv(&mut states).await,
        ConnectionState::Reconnecting { attempt: 2 }
    );
    let failed = recv(&mut states).await;
    assert!(matches!(failed, ConnectionState::Failed { .. }));

    // Parked: no further attempts on their own.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(states.try_next().is_err(), "parked loop kept retrying");

    // A manual resume starts a fresh round.
    connection.connect();
    assert_eq!(recv(&mut states).await, ConnectionState::Connecting);

    connection.disconnect();
}
