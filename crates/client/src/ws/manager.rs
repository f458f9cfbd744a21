//! Owns the single echo-endpoint connection for the whole app.
//!
//! `SyncManager` mounts once near the root, defers a second to let the
//! first render settle, then builds the connection lazily. Socket and
//! fan-out callbacks never touch global signals directly: they forward
//! through a channel that the manager's own task drains, so every store
//! write happens on the UI runtime regardless of platform.

use std::rc::Rc;

use dioxus::prelude::*;
use futures_channel::mpsc;
use futures_util::StreamExt;
use shopdash_shared::{Product, RealtimeEvent, SyncEnvelope};

use super::connection::{ConnectionState, ReconnectConfig, WsConnection, WsHandle};
use super::fanout::FanoutChannel;
use crate::{log_error, log_warn};

/// Public echo endpoint: every frame sent is reflected back verbatim on
/// the same connection.
pub static ECHO_ENDPOINT: &str = "wss://echo.websocket.org";

/// Delay before the connection is first established, so the initial
/// render is not competing with the handshake.
const CONNECT_DELAY_MS: u32 = 1000;

/// Current connection state, updated by the manager.
pub static SYNC_STATE: GlobalSignal<ConnectionState> =
    Signal::global(|| ConnectionState::Disconnected);

/// Most recent decoded event (socket or sibling tab).
pub static LAST_EVENT: GlobalSignal<Option<RealtimeEvent>> = Signal::global(|| None);

/// Running count of delivered events.
pub static EVENT_COUNT: GlobalSignal<u64> = Signal::global(|| 0);

/// The live connection and its send handle. `None` until the manager has
/// mounted and the connect delay elapsed.
static SYNC_CONNECTION: GlobalSignal<Option<Rc<WsConnection>>> = Signal::global(|| None);
static SYNC_HANDLE: GlobalSignal<Option<WsHandle>> = Signal::global(|| None);

/// Everything the UI task applies to the global stores.
enum Update {
    State(ConnectionState),
    Event(RealtimeEvent),
    Sibling(SyncEnvelope),
}

/// Component that owns the realtime connection. Mount it once, above any
/// view that reads [`SYNC_STATE`] or the catalog store.
#[component]
pub fn SyncManager(children: Element) -> Element {
    use_future(move || async move {
        sleep_ms(CONNECT_DELAY_MS).await;
        if SYNC_CONNECTION.read().is_some() {
            return;
        }

        let (update_tx, mut update_rx) = mpsc::unbounded::<Update>();

        let sibling_tx = update_tx.clone();
        let fanout = FanoutChannel::open(move |envelope| {
            let _ = sibling_tx.unbounded_send(Update::Sibling(envelope));
        });

        let event_tx = update_tx.clone();
        let state_tx = update_tx;
        let connection = WsConnection::new(
            ECHO_ENDPOINT,
            fanout,
            move |event| {
                let _ = event_tx.unbounded_send(Update::Event(event));
            },
            move |state| {
                let _ = state_tx.unbounded_send(Update::State(state));
            },
            ReconnectConfig::default(),
        );
        *SYNC_HANDLE.write() = Some(connection.handle());
        *SYNC_CONNECTION.write() = Some(Rc::new(connection));

        while let Some(update) = update_rx.next().await {
            apply_update(update);
        }
    });

    use_drop(move || {
        if let Some(connection) = SYNC_CONNECTION.write().take() {
            connection.disconnect();
        }
        *SYNC_HANDLE.write() = None;
        *SYNC_STATE.write() = ConnectionState::Disconnected;
    });

    rsx! {
        {children}
    }
}

fn apply_update(update: Update) {
    match update {
        Update::State(state) => {
            *SYNC_STATE.write() = state;
        }
        Update::Event(event) => {
            if event.is_new_product() {
                if let Some(product) = event.product.clone() {
                    crate::stores::add_product(product);
                }
            }
            *EVENT_COUNT.write() += 1;
            *LAST_EVENT.write() = Some(event);
        }
        Update::Sibling(envelope) => {
            let event = envelope.into_event();
            if let Some(product) = event.product.clone() {
                crate::stores::add_product(product);
            }
            *EVENT_COUNT.write() += 1;
            *LAST_EVENT.write() = Some(event);
        }
    }
}

/// Whether the realtime connection is currently up.
pub fn is_connected() -> bool {
    SYNC_STATE.read().is_connected()
}

/// Ask a failed or backing-off connection to retry now.
pub fn connect() {
    match &*SYNC_CONNECTION.read() {
        Some(connection) => connection.connect(),
        None => log_warn!("connect: sync manager not mounted"),
    }
}

/// Queue an event on the socket. Dropped with a log line when the
/// manager is not mounted.
pub fn send(event: RealtimeEvent) {
    match &*SYNC_HANDLE.read() {
        Some(handle) => {
            if let Err(e) = handle.send(event) {
                log_error!("send: {}", e);
            }
        }
        None => log_warn!("send: sync manager not mounted"),
    }
}

/// Announce a locally created product over the socket and to sibling tabs.
pub fn send_new_product(product: Product) {
    match &*SYNC_HANDLE.read() {
        Some(handle) => handle.send_new_product(product),
        None => log_warn!("send_new_product: sync manager not mounted"),
    }
}

/// Mirror a product to sibling tabs without a network send.
pub fn sync_new_product(product: Product) {
    match &*SYNC_HANDLE.read() {
        Some(handle) => handle.sync_new_product(product),
        None => log_warn!("sync_new_product: sync manager not mounted"),
    }
}

async fn sleep_ms(ms: u32) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::TimeoutFuture::new(ms).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(std::time::Duration::from_millis(ms as u64)).await;
}
