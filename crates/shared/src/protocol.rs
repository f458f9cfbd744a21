//! Realtime wire protocol: socket frames and the cross-tab sync envelope.
//!
//! The external endpoint is a plain echo service, so the "protocol" is
//! whatever we put on the wire: JSON-text frames shaped like
//! `{"event": "...", ...}`. The endpoint also emits a plain-text banner
//! on connect, and arbitrary text can arrive at any time, so inbound
//! frames go through [`classify_frame`] before anything else happens.

use serde::{Deserialize, Serialize};

use crate::models::Product;

/// Event discriminator for a newly created product.
pub const EVENT_NEW_PRODUCT: &str = "new_product";
/// Event discriminator wrapping unrecognized plain-text frames.
pub const EVENT_TEXT: &str = "text";
/// Prefix of the server banner the echo endpoint sends on connect
/// (e.g. "Request served by ...").
pub const GREETING_PREFIX: &str = "Request";
/// Name of the same-origin broadcast channel used for tab-to-tab sync.
pub const FANOUT_CHANNEL: &str = "products-sync";

/// One message on the realtime socket, in either direction.
///
/// Only `new_product` is materially handled; other events pass through
/// to subscribers as opaque payloads, with unknown fields preserved in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    #[serde(default)]
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    /// Bearer token attached on send when a session exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Verbatim payload for `text` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RealtimeEvent {
    pub fn new_product(product: Product) -> Self {
        Self {
            event: EVENT_NEW_PRODUCT.to_string(),
            product: Some(product),
            token: None,
            data: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn text(data: impl Into<String>) -> Self {
        Self {
            event: EVENT_TEXT.to_string(),
            product: None,
            token: None,
            data: Some(data.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// True when this event carries a product to insert into the catalog.
    pub fn is_new_product(&self) -> bool {
        self.event == EVENT_NEW_PRODUCT && self.product.is_some()
    }
}

/// Where a fan-out envelope originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncSource {
    /// Posted by the creating tab itself, before any network round trip.
    Local,
    /// Mirrored from a frame received over the socket.
    Websocket,
}

/// Envelope broadcast on the same-origin channel. Serialized as
/// `{"type": "NEW_PRODUCT", "product": ..., "source": ...}`; envelopes
/// with an unknown `type` fail to decode and are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncEnvelope {
    #[serde(rename = "NEW_PRODUCT")]
    NewProduct { product: Product, source: SyncSource },
}

impl SyncEnvelope {
    pub fn new_product(product: Product, source: SyncSource) -> Self {
        Self::NewProduct { product, source }
    }

    /// Synthesize the realtime event that downstream state handling sees,
    /// so store updates are agnostic to how the product arrived.
    pub fn into_event(self) -> RealtimeEvent {
        match self {
            Self::NewProduct { product, .. } => RealtimeEvent::new_product(product),
        }
    }
}

/// Result of classifying one inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Server banner; logged and dropped, never delivered.
    Greeting(String),
    /// Well-formed JSON event, delivered to subscribers.
    Event(RealtimeEvent),
    /// Non-JSON text, delivered wrapped as a `text` event. Also covers
    /// valid JSON that does not fit the event shape (arrays, scalars):
    /// delivered verbatim, business logic ignores it.
    Text(String),
    /// `{`/`[`-prefixed frame that is not valid JSON; logged and dropped.
    Malformed(String),
}

/// Classify an inbound text frame. Applied in priority order: greeting
/// banner first, then JSON-looking payloads, then everything else as
/// plain text. Never panics on malformed input.
pub fn classify_frame(raw: &str) -> InboundFrame {
    let trimmed = raw.trim();

    if trimmed.starts_with(GREETING_PREFIX) {
        return InboundFrame::Greeting(trimmed.to_string());
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<RealtimeEvent>(trimmed) {
            Ok(event) => InboundFrame::Event(event),
            // Valid JSON that is not an event object (an array, say)
            // still reaches subscribers; only a parse failure is dropped.
            Err(e) => match serde_json::from_str::<serde_json::Value>(trimmed) {
                Ok(_) => InboundFrame::Text(trimmed.to_string()),
                Err(_) => InboundFrame::Malformed(e.to_string()),
            },
        };
    }

    InboundFrame::Text(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: 1_700_000_000_000,
            title: "Echo Test Product".to_string(),
            description: "Testing echo functionality".to_string(),
            price: 123.45,
            category: "beauty".to_string(),
            rating: Some(4.0),
            stock: Some(12),
            discount_percentage: Some(5.0),
            brand: None,
            thumbnail: None,
            images: None,
        }
    }

    #[test]
    fn greeting_is_dropped_before_parsing() {
        let frame = classify_frame("Request served by 7811941c69adca");
        assert!(matches!(frame, InboundFrame::Greeting(_)));
    }

    #[test]
    fn sent_event_survives_the_echo_round_trip() {
        let sent = RealtimeEvent::new_product(product());
        let wire = serde_json::to_string(&sent).unwrap();
        match classify_frame(&wire) {
            InboundFrame::Event(received) => {
                assert_eq!(received.product, Some(product()));
                assert_eq!(received, sent);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn token_is_not_serialized_when_absent() {
        let wire = serde_json::to_string(&RealtimeEvent::new_product(product())).unwrap();
        assert!(!wire.contains("token"));
    }

    #[test]
    fn truncated_json_is_malformed_not_a_panic() {
        assert!(matches!(
            classify_frame("{\"event\": \"new_product\""),
            InboundFrame::Malformed(_)
        ));
        assert!(matches!(classify_frame("[1, 2,"), InboundFrame::Malformed(_)));
    }

    #[test]
    fn valid_json_array_is_delivered_not_dropped() {
        match classify_frame("[1, 2, 3]") {
            InboundFrame::Text(text) => assert_eq!(text, "[1, 2, 3]"),
            other => panic!("expected delivery, got {other:?}"),
        }
    }

    #[test]
    fn json_object_without_event_field_still_decodes() {
        match classify_frame("{\"ping\": true}") {
            InboundFrame::Event(event) => {
                assert_eq!(event.event, "");
                assert!(!event.is_new_product());
                assert_eq!(event.extra.get("ping"), Some(&serde_json::Value::Bool(true)));
            }
            other => panic!("expected opaque event, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_is_wrapped_verbatim() {
        match classify_frame("  hello there  ") {
            InboundFrame::Text(text) => assert_eq!(text, "hello there"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn envelope_wire_shape_matches_channel_contract() {
        let env = SyncEnvelope::new_product(product(), SyncSource::Websocket);
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains("\"type\":\"NEW_PRODUCT\""));
        assert!(json.contains("\"source\":\"websocket\""));
        let back: SyncEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn unknown_envelope_type_fails_to_decode() {
        let json = r#"{"type":"PRESENCE","user":"x"}"#;
        assert!(serde_json::from_str::<SyncEnvelope>(json).is_err());
    }

    #[test]
    fn envelope_synthesizes_new_product_event() {
        let env = SyncEnvelope::new_product(product(), SyncSource::Local);
        let event = env.into_event();
        assert!(event.is_new_product());
        assert_eq!(event.product, Some(product()));
    }
}
