//! Authentication session management with persistent storage.

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};
use shopdash_shared::{ApiError, LoginRequest, LoginResponse, UserProfile};

use crate::api_client::ApiClient;
use crate::storage;

/// Base URL of the demo REST API.
pub const API_BASE_URL: &str = "https://dummyjson.com";

const SESSION_KEY: &str = "shopdash_session";
const TOKEN_TTL_MINS: u32 = 60;

/// Authentication context provided to the app.
#[derive(Clone, Copy, Debug)]
pub struct AuthContext {
    pub session: Signal<Option<AuthSession>>,
}

/// Stored session data: the bearer token plus the profile shown in the
/// dashboard header.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

/// Provider component that sets up the auth context and keeps it in
/// sync with persistent storage.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let session = use_signal(|| storage::load::<AuthSession>(SESSION_KEY));

    use_effect(move || {
        match session.read().as_ref() {
            Some(sess) => {
                storage::save(SESSION_KEY, sess);
            }
            None => storage::remove(SESSION_KEY),
        }
    });

    use_context_provider(|| AuthContext { session });

    children
}

impl AuthContext {
    /// Log in against the demo API. On success the session is committed
    /// and persisted; on failure nothing changes and a user-displayable
    /// message is returned.
    pub async fn login(&mut self, username: String, password: String) -> Result<(), String> {
        let req = LoginRequest {
            username,
            password,
            expires_in_mins: Some(TOKEN_TTL_MINS),
        };

        let client = ApiClient::new().with_base_url(API_BASE_URL);
        match client
            .post_json::<LoginRequest, LoginResponse>("/auth/login", &req)
            .await
        {
            Ok(res) => {
                let session = AuthSession {
                    token: res.access_token.clone(),
                    user: UserProfile::from(&res),
                };
                self.session.set(Some(session));
                Ok(())
            }
            Err(ApiError::Http { status, body }) => {
                let msg = shopdash_shared::extract_message(&body).unwrap_or(body);
                Err(format!("Login failed ({status}): {msg}"))
            }
            Err(e) => Err(format!("Login failed: {e}")),
        }
    }

    /// Clear the session and its persisted copy.
    pub fn logout(&mut self) {
        storage::remove(SESSION_KEY);
        self.session.set(None);
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    /// An API client configured for the current session.
    pub fn client(&self) -> ApiClient {
        ApiClient::new()
            .with_base_url(API_BASE_URL)
            .with_token(self.token())
    }
}

/// Synchronous token lookup straight from storage, for callers outside
/// the component tree (the realtime client consults this on every send).
pub fn stored_token() -> Option<String> {
    storage::load::<AuthSession>(SESSION_KEY).map(|s| s.token)
}
