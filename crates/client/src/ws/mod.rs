//! Realtime synchronization for the product catalog.
//!
//! This module provides:
//! - A single managed connection to the external echo endpoint, with
//!   auto-reconnect and bounded exponential backoff
//! - A same-origin fan-out channel that mirrors new products to other
//!   tabs/windows without touching the network
//! - Direct writes to the global catalog store (components read from
//!   the store, not from events)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   SyncManager                    │
//! │  (owns the one WsConnection for the whole app)   │
//! └──────────────────────────────────────────────────┘
//!              │                        │
//!              ▼                        ▼
//!      ┌──────────────┐        ┌───────────────┐
//!      │ WsConnection │◄──────►│ FanoutChannel │
//!      │ (echo socket)│ mirror │ (other tabs)  │
//!      └──────────────┘        └───────────────┘
//!              │ decoded events         │ envelopes
//!              └───────────┬────────────┘
//!                          ▼
//!                 ┌─────────────────┐
//!                 │  CATALOG store  │
//!                 └─────────────────┘
//!                          │
//!              components read the store
//! ```
//!
//! The echo endpoint only reflects frames back to the sender's own
//! connection, never to other tabs' connections; the fan-out channel is
//! what keeps sibling tabs consistent. A product created locally can
//! therefore arrive twice (own echo plus own fan-out); the catalog
//! store's insert-if-absent transition absorbs the duplicate.

mod connection;
mod fanout;
mod hooks;
mod manager;

pub use connection::{ConnectionState, ReconnectConfig, WsConnection, WsHandle};
pub use fanout::FanoutChannel;
pub use hooks::{use_connection_state, use_last_event};
pub use manager::{
    connect, is_connected, send, send_new_product, sync_new_product, SyncManager, ECHO_ENDPOINT,
    EVENT_COUNT, LAST_EVENT, SYNC_STATE,
};
