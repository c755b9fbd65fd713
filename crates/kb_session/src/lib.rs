//! Authentication state for knowledge-base API callers.
//!
//! The [`SessionManager`] decides once, at construction, whether requests run in
//! [`AuthMode::Mock`] or [`AuthMode::Cookie`] and holds the credential used for
//! authenticated calls. Construction never fails: an unusable persisted
//! credential downgrades the manager to mock mode and the reason is kept for
//! status reporting.
//!
//! The server-side half of the login flow lives in [`store`]: an injectable,
//! lazily-evicting map of issued session ids.

mod cache;
mod config;
mod error;
mod manager;
mod mode;
mod paths;
mod session;
pub mod store;

pub use cache::{init_cookie_session, parse_expiry, CredentialCache};
pub use config::{
    SessionConfig, BASE_URL_ENV_VAR, CACHE_PATH_ENV_VAR, DEFAULT_BASE_URL,
    DEFAULT_PRODUCTION_PREFIX, PRODUCTION_PREFIX_ENV_VAR,
};
pub use error::{AuthError, FallbackReason};
pub use manager::{AuthStatus, SessionManager};
pub use mode::{classify_base_url, AuthMode};
pub use paths::{default_cache_path, CACHE_FILE_NAME};
pub use session::{Session, MOCK_CREDENTIAL, MOCK_SESSION_LIFETIME, VALIDITY_BUFFER};
pub use store::{
    issue_session, InMemorySessionStore, SessionRecord, SessionStore, SERVER_SESSION_LIFETIME,
};
