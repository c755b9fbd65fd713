use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::cache::CredentialCache;
use crate::config::{normalize_base_url, SessionConfig};
use crate::error::{AuthError, FallbackReason};
use crate::mode::{classify_base_url, AuthMode};
use crate::session::Session;

/// Holds and validates the credential used for authenticated API calls.
///
/// The mode is fixed at construction. The held [`Session`] is swapped as a
/// whole on invalidation, so concurrent readers never observe a half-updated
/// credential.
#[derive(Debug)]
pub struct SessionManager {
    mode: AuthMode,
    base_url: String,
    mock_lifetime: Duration,
    session: RwLock<Option<Session>>,
    fallback_reason: Option<FallbackReason>,
    user_info: Value,
}

/// Snapshot of the manager's state for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthStatus {
    pub auth_mode: AuthMode,
    pub base_url: String,
    pub is_session_valid: bool,
    pub session_cookie_length: usize,
    pub expires_at: Option<String>,
    pub fallback_reason: Option<String>,
    pub user_info: Value,
}

impl SessionManager {
    /// Construct from the process environment. See [`SessionConfig::from_env`].
    pub fn from_env(explicit_base_url: Option<&str>) -> Self {
        Self::new(SessionConfig::from_env(explicit_base_url))
    }

    pub fn new(config: SessionConfig) -> Self {
        Self::new_at(config, OffsetDateTime::now_utc())
    }

    /// Construct as of `now`. Always succeeds; unusable cookie credentials fall
    /// back to mock mode against the default base URL.
    pub fn new_at(config: SessionConfig, now: OffsetDateTime) -> Self {
        let base_url = normalize_base_url(&config.base_url);
        let requested = classify_base_url(&base_url, &config.production_prefix);

        let manager = match requested {
            AuthMode::Mock => Self::mock(base_url, config.mock_lifetime, now, None),
            AuthMode::Cookie => match Self::load_cookie(&config, now) {
                Ok((session, user_info)) => {
                    info!(
                        expires_at = %format_timestamp(session.expires_at()).unwrap_or_default(),
                        "cookie auth initialized"
                    );
                    Self {
                        mode: AuthMode::Cookie,
                        base_url,
                        mock_lifetime: config.mock_lifetime,
                        session: RwLock::new(Some(session)),
                        fallback_reason: None,
                        user_info,
                    }
                }
                Err(reason) => {
                    warn!(%reason, "no usable cookie credential; falling back to mock mode");
                    Self::mock(
                        normalize_base_url(&config.default_base_url),
                        config.mock_lifetime,
                        now,
                        Some(reason),
                    )
                }
            },
        };

        info!(mode = manager.mode.as_str(), base_url = %manager.base_url, "auth session initialized");
        manager
    }

    fn load_cookie(
        config: &SessionConfig,
        now: OffsetDateTime,
    ) -> Result<(Session, Value), FallbackReason> {
        let cache = CredentialCache::load(&config.cache_path)?;
        let user_info = cache.user_info.clone();
        let session = cache.into_session(&config.cache_path, now)?;
        Ok((session, user_info))
    }

    fn mock(
        base_url: String,
        mock_lifetime: Duration,
        now: OffsetDateTime,
        fallback_reason: Option<FallbackReason>,
    ) -> Self {
        Self {
            mode: AuthMode::Mock,
            base_url,
            mock_lifetime,
            session: RwLock::new(Some(Session::mock(now, mock_lifetime))),
            fallback_reason,
            user_info: Value::Object(Default::default()),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Why cookie mode was abandoned at construction, if it was.
    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        self.fallback_reason.as_ref()
    }

    pub fn user_info(&self) -> &Value {
        &self.user_info
    }

    /// Clone of the currently held session, if any.
    pub fn current_session(&self) -> Option<Session> {
        read_unpoisoned(&self.session).clone()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(OffsetDateTime::now_utc())
    }

    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        let valid = read_unpoisoned(&self.session)
            .as_ref()
            .is_some_and(|session| session.is_valid_at(now));
        debug!(valid, "session validity check");
        valid
    }

    pub fn authenticate(&self) -> Result<String, AuthError> {
        self.authenticate_at(OffsetDateTime::now_utc())
    }

    /// Return the credential to use for a request made at `now`.
    ///
    /// Mock mode never fails; a missing or stale mock session is replaced by a
    /// fresh one. Cookie mode never refreshes: an unusable session is cleared
    /// and re-authentication is left to the external login tool.
    pub fn authenticate_at(&self, now: OffsetDateTime) -> Result<String, AuthError> {
        match self.mode {
            AuthMode::Mock => {
                let mut guard = write_unpoisoned(&self.session);
                let fresh = match guard.as_ref() {
                    Some(session) if session.is_valid_at(now) => None,
                    _ => Some(Session::mock(now, self.mock_lifetime)),
                };
                if let Some(session) = fresh {
                    *guard = Some(session);
                }
                Ok(guard
                    .as_ref()
                    .map(|session| session.credential().to_string())
                    .unwrap_or_default())
            }
            AuthMode::Cookie => {
                let mut guard = write_unpoisoned(&self.session);
                let credential = guard
                    .as_ref()
                    .filter(|session| session.is_valid_at(now))
                    .map(|session| session.credential().to_string());
                if let Some(credential) = credential {
                    return Ok(credential);
                }

                if guard.take().is_some() {
                    warn!("cookie session expired; re-authenticate out of band");
                }
                Err(AuthError::SessionUnavailable)
            }
        }
    }

    /// Drop the held session.
    pub fn invalidate(&self) {
        *write_unpoisoned(&self.session) = None;
    }

    /// Record that the server answered 401 for the held credential.
    ///
    /// Cookie sessions are cleared; mock sessions are left alone because mock
    /// authentication cannot be rejected for credential reasons.
    pub fn reject(&self) -> AuthError {
        if self.mode == AuthMode::Cookie {
            warn!("credential rejected (401); cookie might be expired");
            self.invalidate();
        }
        AuthError::Rejected
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.auth_status_at(OffsetDateTime::now_utc())
    }

    pub fn auth_status_at(&self, now: OffsetDateTime) -> AuthStatus {
        let session = self.current_session();
        AuthStatus {
            auth_mode: self.mode,
            base_url: self.base_url.clone(),
            is_session_valid: session
                .as_ref()
                .is_some_and(|session| session.is_valid_at(now)),
            session_cookie_length: session
                .as_ref()
                .map_or(0, |session| session.credential().len()),
            expires_at: session
                .as_ref()
                .and_then(|session| format_timestamp(session.expires_at())),
            fallback_reason: self.fallback_reason.as_ref().map(ToString::to_string),
            user_info: self.user_info.clone(),
        }
    }
}

fn format_timestamp(value: OffsetDateTime) -> Option<String> {
    value.format(&Rfc3339).ok()
}

fn read_unpoisoned<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_unpoisoned<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
