//! Hooks for components that care about the realtime connection.
//!
//! Kept minimal on purpose: product data flows through the catalog
//! store, not through events, so most components never need these.

use dioxus::prelude::ReadableExt;
use shopdash_shared::RealtimeEvent;

use super::connection::ConnectionState;
use super::manager::{LAST_EVENT, SYNC_STATE};

/// Current connection state (reactive).
pub fn use_connection_state() -> ConnectionState {
    SYNC_STATE.read().clone()
}

/// Most recent event delivered by the socket or a sibling tab (reactive).
pub fn use_last_event() -> Option<RealtimeEvent> {
    LAST_EVENT.read().clone()
}
