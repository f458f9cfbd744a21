//! Client-side error types for the REST collaborator.

use serde::Deserialize;
use thiserror::Error;

/// What went wrong talking to the HTTP API. Every variant renders to a
/// string the UI can display; nothing here is allowed to crash the app.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Failed to decode response: {0}")]
    Deserialize(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull the `message` field out of an API error body, if there is one.
/// dummyjson returns `{"message": "..."}` for auth failures; anything
/// else falls back to the raw body at the call site.
pub fn extract_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok()?;
    let message = parsed.message.trim();
    if message.is_empty() {
        return None;
    }
    Some(message.to_string())
}

impl ApiError {
    /// A message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { body, .. } => {
                extract_message(body).unwrap_or_else(|| self.to_string())
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_field() {
        assert_eq!(
            extract_message(r#"{"message":"Invalid credentials"}"#),
            Some("Invalid credentials".to_string())
        );
    }

    #[test]
    fn non_json_body_yields_none() {
        assert_eq!(extract_message("<html>502</html>"), None);
        assert_eq!(extract_message(r#"{"message":"  "}"#), None);
    }

    #[test]
    fn http_error_prefers_embedded_message() {
        let err = ApiError::Http {
            status: 400,
            body: r#"{"message":"Invalid credentials"}"#.to_string(),
        };
        assert_eq!(err.user_message(), "Invalid credentials");

        let opaque = ApiError::Http {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(opaque.user_message(), "HTTP 502: bad gateway");
    }
}
