//! Shopdash client - Dioxus web/desktop application.
//!
//! A realtime product dashboard: login against the dummyjson demo API,
//! a protected catalog view, and live propagation of newly created
//! products to every open view through an echo WebSocket plus a
//! same-origin broadcast channel.

pub mod api_client;
pub mod auth_session;
pub mod logging;
pub mod storage;

pub mod components;
pub mod routes;
pub mod stores;
pub mod views;
pub mod ws;

pub use api_client::ApiClient;
pub use auth_session::{AuthContext, AuthProvider, AuthSession};
pub use routes::Route;
