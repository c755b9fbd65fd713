use std::env;
use std::str::FromStr;
use std::time::Duration;

use kb_api::StreamSettings;
use tracing::warn;

pub const HOST_ENV_VAR: &str = "KB_MOCK_HOST";
pub const PORT_ENV_VAR: &str = "KB_MOCK_PORT";
pub const CITATION_CAP_ENV_VAR: &str = "KB_MOCK_CITATION_CAP";
pub const FRAME_DELAY_ENV_VAR: &str = "KB_MOCK_FRAME_DELAY_MS";
pub const CHUNK_WIDTH_ENV_VAR: &str = "KB_MOCK_CHUNK_WIDTH";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockServerConfig {
    pub host: String,
    pub port: u16,
    pub stream: StreamSettings,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            stream: StreamSettings::default(),
        }
    }
}

impl MockServerConfig {
    /// Defaults overridden by `KB_MOCK_*` variables. Blank or unparsable values
    /// are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(host) = env_string_opt(HOST_ENV_VAR) {
            config.host = host;
        }
        if let Some(port) = env_parse_opt(PORT_ENV_VAR) {
            config.port = port;
        }
        if let Some(cap) = env_parse_opt(CITATION_CAP_ENV_VAR) {
            config.stream.citation_cap = cap;
        }
        if let Some(width) = env_parse_opt(CHUNK_WIDTH_ENV_VAR) {
            config.stream.chunk_width = width;
        }
        if let Some(delay_ms) = env_parse_opt::<u64>(FRAME_DELAY_ENV_VAR) {
            config.stream.frame_delay = Duration::from_millis(delay_ms);
        }

        config
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_parse_opt<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_string_opt(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}
