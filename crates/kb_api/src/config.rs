use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("kb_api/", env!("CARGO_PKG_VERSION"));

/// Transport configuration for knowledge-base API requests.
#[derive(Debug, Clone)]
pub struct KbApiConfig {
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Whole-request timeout, body included.
    pub timeout: Option<Duration>,
}

impl Default for KbApiConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl KbApiConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub(crate) fn resolved_user_agent(&self) -> String {
        self.user_agent
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_USER_AGENT)
            .to_owned()
    }
}
