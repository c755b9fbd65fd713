use std::fmt;

use kb_session::AuthError;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum KbApiError {
    /// No usable credential, or the server rejected it with 401.
    Authentication(AuthError),
    /// Transport failure (connect, timeout, broken body stream).
    Network(reqwest::Error),
    /// Non-2xx response other than 401.
    Status(StatusCode, String),
    UnsupportedMethod(String),
    InvalidBaseUrl(String),
    InvalidHeader(String),
    MissingCredential,
    MissingSessionCookie,
    Serde(JsonError),
}

impl KbApiError {
    /// Whether repeating the same request may succeed without re-authenticating.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status(status, _) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

impl fmt::Display for KbApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication(error) => write!(f, "authentication failed: {error}"),
            Self::Network(error) => write!(f, "network error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::UnsupportedMethod(method) => write!(f, "unsupported HTTP method: {method}"),
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::MissingCredential => write!(f, "cookie mode requires a non-empty credential"),
            Self::MissingSessionCookie => write!(f, "login response did not set a session cookie"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
        }
    }
}

impl std::error::Error for KbApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Authentication(error) => Some(error),
            Self::Network(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for KbApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error)
    }
}

impl From<JsonError> for KbApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

impl From<AuthError> for KbApiError {
    fn from(error: AuthError) -> Self {
        Self::Authentication(error)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

/// Human-readable message for a failed response body.
///
/// Understands `{"detail": ...}` and `{"message": ...}` bodies; anything else
/// is returned verbatim, and an empty body maps to the status reason.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        let detail = payload.detail.and_then(|detail| match detail {
            serde_json::Value::String(text) => non_empty_string(&text).map(str::to_owned),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });
        if let Some(message) = detail.or_else(|| {
            payload
                .message
                .as_deref()
                .and_then(non_empty_string)
                .map(str::to_owned)
        }) {
            return message;
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

fn non_empty_string(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
