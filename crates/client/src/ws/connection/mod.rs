//! Managed WebSocket connection with state reporting and auto-reconnect.
//!
//! Shared types plus the platform-specific connection loop (web_sys on
//! wasm32, tokio-tungstenite natively). Both implementations expose the
//! same surface: a connection loop task, an `on_event` callback for
//! decoded inbound events, an `on_state` callback for state transitions,
//! and a clonable [`WsHandle`] for queueing outbound frames.

use futures_channel::mpsc::UnboundedSender;
use shopdash_shared::{
    classify_frame, InboundFrame, RealtimeEvent, SyncEnvelope, SyncSource,
};

use super::fanout::FanoutChannel;
use crate::{log_error, log_info, log_warn};

/// Connection state reported through `on_state`. Mutated only by the
/// connection loop itself, never by consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Failed { reason: String },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. }
        )
    }
}

/// Configuration for auto-reconnect behavior.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of automatic reconnect attempts before the loop
    /// parks and waits for a manual `connect()`.
    pub max_attempts: u32,
    /// Initial delay in milliseconds.
    pub initial_delay_ms: u32,
    /// Ceiling for the backoff delay in milliseconds.
    pub max_delay_ms: u32,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 3000,
            max_delay_ms: 30_000,
            backoff_multiplier: 1.5,
        }
    }
}

impl ReconnectConfig {
    /// Backoff delay for a given attempt number (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> u32 {
        let delay = self.initial_delay_ms as f32 * self.backoff_multiplier.powi(attempt as i32);
        (delay as u32).min(self.max_delay_ms)
    }
}

/// Control messages from handles into the connection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    /// Resume after the retry cap was reached (or retry immediately).
    Resume,
    /// Close the socket and stop the loop for good.
    Shutdown,
}

/// How a connected session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// Unexpected close; the loop schedules a reconnect.
    Closed,
    /// Deliberate teardown; the loop stops.
    Shutdown,
}

/// Handle for queueing frames on a connection. Frames queued while the
/// socket is down are flushed once the loop reconnects, so senders never
/// observe transient connectivity errors.
#[derive(Clone)]
pub struct WsHandle {
    sender: UnboundedSender<RealtimeEvent>,
    fanout: FanoutChannel,
}

impl WsHandle {
    pub(crate) fn new(sender: UnboundedSender<RealtimeEvent>, fanout: FanoutChannel) -> Self {
        Self { sender, fanout }
    }

    /// Queue an event for the socket. The stored bearer token, when one
    /// exists, is attached before serialization.
    pub fn send(&self, mut event: RealtimeEvent) -> Result<(), String> {
        if event.token.is_none() {
            event.token = crate::auth_session::stored_token();
        }
        self.sender
            .unbounded_send(event)
            .map_err(|e| format!("failed to queue frame: {e}"))
    }

    /// Announce a locally created product: send it over the socket and
    /// mirror it onto the fan-out channel for sibling tabs.
    pub fn send_new_product(&self, product: shopdash_shared::Product) {
        if let Err(e) = self.send(RealtimeEvent::new_product(product.clone())) {
            log_error!("send_new_product: {}", e);
        }
        self.fanout
            .post(&SyncEnvelope::new_product(product, SyncSource::Local));
    }

    /// Mirror a product to sibling tabs only, without a network send.
    pub fn sync_new_product(&self, product: shopdash_shared::Product) {
        self.fanout
            .post(&SyncEnvelope::new_product(product, SyncSource::Local));
    }
}

/// Classify one inbound text frame and route it.
///
/// Greeting banners and malformed JSON are logged and dropped. Decoded
/// `new_product` events are mirrored onto the fan-out channel (tagged
/// `websocket`) before delivery, so tabs without their own socket stay
/// consistent.
pub(crate) fn dispatch_frame(
    raw: &str,
    fanout: &FanoutChannel,
    on_event: &dyn Fn(RealtimeEvent),
) {
    match classify_frame(raw) {
        InboundFrame::Greeting(banner) => {
            log_info!("server greeting: {}", banner);
        }
        InboundFrame::Event(event) => {
            if event.is_new_product() {
                if let Some(product) = event.product.clone() {
                    fanout.post(&SyncEnvelope::new_product(product, SyncSource::Websocket));
                }
            }
            on_event(event);
        }
        InboundFrame::Text(text) => {
            log_info!("non-JSON text frame: {}", text);
            on_event(RealtimeEvent::text(text));
        }
        InboundFrame::Malformed(err) => {
            log_error!("dropping malformed frame: {}", err);
        }
    }
}

/// Log-and-drop for frames the protocol does not carry (binary payloads).
pub(crate) fn drop_non_text_frame(len: usize) {
    log_warn!("dropping non-text frame ({} bytes); protocol is JSON text", len);
}

#[cfg(target_arch = "wasm32")]
mod connection_wasm;
#[cfg(target_arch = "wasm32")]
pub use connection_wasm::WsConnection;

#[cfg(not(target_arch = "wasm32"))]
mod connection_native;
#[cfg(not(target_arch = "wasm32"))]
pub use connection_native::WsConnection;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use shopdash_shared::Product;
    use std::sync::{Arc, Mutex};

    fn product(id: i64) -> Product {
        Product {
            id,
            title: "Echo Test Product".to_string(),
            description: "Testing echo functionality".to_string(),
            price: 123.45,
            category: "beauty".to_string(),
            rating: None,
            stock: None,
            discount_percentage: None,
            brand: None,
            thumbnail: None,
            images: None,
        }
    }

    #[test]
    fn backoff_grows_by_half_each_attempt() {
        let config = ReconnectConfig::default();
        assert_eq!(config.delay_for_attempt(0), 3000);
        assert_eq!(config.delay_for_attempt(1), 4500);
        assert_eq!(config.delay_for_attempt(2), 6750);
    }

    #[test]
    fn backoff_is_capped() {
        let config = ReconnectConfig {
            max_attempts: 100,
            initial_delay_ms: 3000,
            max_delay_ms: 10_000,
            backoff_multiplier: 1.5,
        };
        assert_eq!(config.delay_for_attempt(50), 10_000);
    }

    #[tokio::test]
    async fn dispatch_delivers_events_and_drops_noise() {
        let fanout = FanoutChannel::open(|_| {});
        let seen: Arc<Mutex<Vec<RealtimeEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let on_event = move |event: RealtimeEvent| sink.lock().unwrap().push(event);

        dispatch_frame("Request served by test", &fanout, &on_event);
        dispatch_frame("{\"event\": \"new_product\"", &fanout, &on_event);
        let wire = serde_json::to_string(&RealtimeEvent::new_product(product(1))).unwrap();
        dispatch_frame(&wire, &fanout, &on_event);
        dispatch_frame("hello", &fanout, &on_event);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].product, Some(product(1)));
        assert_eq!(seen[1].event, "text");
        assert_eq!(seen[1].data.as_deref(), Some("hello"));
        fanout.close();
    }

    #[tokio::test]
    async fn inbound_new_product_is_mirrored_to_fanout() {
        let (tx, mut rx) = futures_channel::mpsc::unbounded();
        // Receiving channel, as another tab would hold.
        let receiver = FanoutChannel::open(move |envelope| {
            let _ = tx.unbounded_send(envelope);
        });
        let sender_side = FanoutChannel::open(|_| {});

        let wire = serde_json::to_string(&RealtimeEvent::new_product(product(9))).unwrap();
        dispatch_frame(&wire, &sender_side, &|_| {});

        // The bus is shared with any concurrently running test, so wait
        // for this test's own envelope specifically.
        use futures_util::StreamExt;
        let wanted = SyncEnvelope::new_product(product(9), SyncSource::Websocket);
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(1);
        loop {
            let envelope = tokio::time::timeout_at(deadline, rx.next())
                .await
                .expect("fanout delivery timed out")
                .expect("channel closed");
            if envelope == wanted {
                break;
            }
        }
        receiver.close();
        sender_side.close();
    }
}
