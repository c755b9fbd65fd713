use std::time::Duration;

use time::{OffsetDateTime, PrimitiveDateTime};

use crate::mode::AuthMode;

/// Constant credential held in mock mode.
pub const MOCK_CREDENTIAL: &str = "mock_session_cookie";
/// Lifetime of a freshly created mock session.
pub const MOCK_SESSION_LIFETIME: Duration = Duration::from_secs(60 * 60);
/// A session stops being usable this long before it actually expires.
pub const VALIDITY_BUFFER: Duration = Duration::from_secs(5 * 60);

/// One authenticated-access unit. Replaced whole, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    mode: AuthMode,
    credential: String,
    expires_at: OffsetDateTime,
}

impl Session {
    #[must_use]
    pub fn new(mode: AuthMode, credential: impl Into<String>, expires_at: OffsetDateTime) -> Self {
        Self {
            mode,
            credential: credential.into(),
            expires_at,
        }
    }

    /// Synthetic session for mock mode, valid for `lifetime` from `now`.
    ///
    /// Lifetimes past the representable range end at the latest supported
    /// timestamp.
    #[must_use]
    pub fn mock(now: OffsetDateTime, lifetime: Duration) -> Self {
        let expires_at = time::Duration::try_from(lifetime)
            .ok()
            .and_then(|lifetime| now.checked_add(lifetime))
            .unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc());
        Self::new(AuthMode::Mock, MOCK_CREDENTIAL, expires_at)
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    /// `now < expires_at - 5min` and the credential is non-empty.
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        !self.credential.is_empty() && now < self.expires_at - VALIDITY_BUFFER
    }
}
