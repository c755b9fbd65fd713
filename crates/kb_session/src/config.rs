use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths::default_cache_path;
use crate::session::MOCK_SESSION_LIFETIME;

/// Local mock API used when no base URL is configured and after a fallback.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Base URLs starting with this prefix run in cookie mode.
pub const DEFAULT_PRODUCTION_PREFIX: &str = "https://codesentinel";

pub const BASE_URL_ENV_VAR: &str = "KB_API_HOST";
pub const PRODUCTION_PREFIX_ENV_VAR: &str = "KB_PRODUCTION_URL_PREFIX";
pub const CACHE_PATH_ENV_VAR: &str = "KB_AUTH_CACHE_PATH";

/// Inputs for [`crate::SessionManager`] construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Requested base URL; normalized (trimmed, no trailing `/`) on construction.
    pub base_url: String,
    /// Base URL restored after falling back to mock mode.
    pub default_base_url: String,
    pub production_prefix: String,
    /// Location of the persisted credential cache read in cookie mode.
    pub cache_path: PathBuf,
    /// Lifetime of the synthetic mock session.
    pub mock_lifetime: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_base_url: DEFAULT_BASE_URL.to_string(),
            production_prefix: DEFAULT_PRODUCTION_PREFIX.to_string(),
            cache_path: default_cache_path(),
            mock_lifetime: MOCK_SESSION_LIFETIME,
        }
    }
}

impl SessionConfig {
    /// Build a config from the process environment.
    ///
    /// Base URL precedence: `explicit_base_url`, then `KB_API_HOST`, then
    /// [`DEFAULT_BASE_URL`].
    pub fn from_env(explicit_base_url: Option<&str>) -> Self {
        let mut config = Self::default();

        if let Some(base_url) = env_string_opt(BASE_URL_ENV_VAR) {
            config.base_url = base_url;
        }
        if let Some(base_url) = explicit_base_url.and_then(non_blank) {
            config.base_url = base_url.to_string();
        }
        if let Some(prefix) = env_string_opt(PRODUCTION_PREFIX_ENV_VAR) {
            config.production_prefix = prefix;
        }
        if let Some(path) = env_string_opt(CACHE_PATH_ENV_VAR) {
            config.cache_path = PathBuf::from(path);
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.default_base_url = base_url.into();
        self
    }

    pub fn with_production_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.production_prefix = prefix.into();
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn with_mock_lifetime(mut self, lifetime: Duration) -> Self {
        self.mock_lifetime = lifetime;
        self
    }
}

/// Trim whitespace and trailing slashes from a base URL.
pub(crate) fn normalize_base_url(input: &str) -> String {
    input.trim().trim_end_matches('/').to_string()
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn defaults_to_local_mock_api() {
        let _lock = env_lock();
        let _host = set_env_guard(BASE_URL_ENV_VAR, None);

        let config = SessionConfig::from_env(None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.production_prefix, DEFAULT_PRODUCTION_PREFIX);
    }

    #[test]
    fn env_overrides_default_base_url() {
        let _lock = env_lock();
        let _host = set_env_guard(BASE_URL_ENV_VAR, Some("http://10.0.0.5:9000"));

        let config = SessionConfig::from_env(None);
        assert_eq!(config.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn explicit_argument_beats_env() {
        let _lock = env_lock();
        let _host = set_env_guard(BASE_URL_ENV_VAR, Some("http://10.0.0.5:9000"));

        let config = SessionConfig::from_env(Some("http://localhost:8123"));
        assert_eq!(config.base_url, "http://localhost:8123");

        let config = SessionConfig::from_env(Some("   "));
        assert_eq!(config.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let _lock = env_lock();
        let _host = set_env_guard(BASE_URL_ENV_VAR, Some(""));
        let _cache = set_env_guard(CACHE_PATH_ENV_VAR, Some("  "));

        let config = SessionConfig::from_env(None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache_path, default_cache_path());
    }

    #[test]
    fn normalize_strips_trailing_slashes() {
        assert_eq!(normalize_base_url(" http://host:1/ "), "http://host:1");
        assert_eq!(normalize_base_url("http://host//"), "http://host");
    }
}
