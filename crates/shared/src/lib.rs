//! Shared types and logic for the shopdash client.
//!
//! Everything in this crate is platform-independent: product models, the
//! realtime wire protocol, the catalog state transitions, and error types.
//! The Dioxus client crate builds on top of these for both web and desktop.

pub mod catalog;
pub mod error;
pub mod models;
pub mod protocol;

pub use catalog::*;
pub use error::*;
pub use models::*;
pub use protocol::*;
