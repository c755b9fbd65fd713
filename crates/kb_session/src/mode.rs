use serde::{Deserialize, Serialize};

/// Operating mode of a [`crate::SessionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// No credential required; authentication always succeeds.
    Mock,
    /// Backed by an externally issued cookie with a finite lifetime.
    Cookie,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Cookie => "cookie",
        }
    }
}

/// Pick the mode for a base URL.
///
/// Cookie mode is selected only when the URL starts with the production prefix
/// (compared case-insensitively). Everything else, including an empty prefix,
/// runs in mock mode.
pub fn classify_base_url(base_url: &str, production_prefix: &str) -> AuthMode {
    let prefix = production_prefix.trim();
    if prefix.is_empty() {
        return AuthMode::Mock;
    }

    let url = base_url.trim().to_ascii_lowercase();
    if url.starts_with(&prefix.to_ascii_lowercase()) {
        AuthMode::Cookie
    } else {
        AuthMode::Mock
    }
}
