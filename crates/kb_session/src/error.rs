use std::path::PathBuf;

use thiserror::Error;

/// Why a cookie-mode manager was downgraded to mock mode at construction.
#[derive(Debug, Error)]
pub enum FallbackReason {
    #[error("credential cache not found at {path}")]
    CacheMissing { path: PathBuf },

    #[error("I/O error while reading credential cache at {path}: {source}")]
    CacheUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credential cache at {path}: {source}")]
    CacheMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("credential cache at {path} has no expiry")]
    MissingExpiry { path: PathBuf },

    #[error("credential cache at {path} has invalid ISO-8601 expiry: {value}")]
    InvalidExpiry { path: PathBuf, value: String },

    #[error("cached credential expired at {expiry}")]
    Expired { expiry: String },

    #[error("credential cache at {path} has an empty cookie")]
    EmptyCookie { path: PathBuf },
}

impl FallbackReason {
    #[must_use]
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheUnreadable {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheMalformed {
            path: path.into(),
            source,
        }
    }
}

/// The manager could not produce a usable credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no valid session: credential missing or expired; re-authenticate out of band")]
    SessionUnavailable,

    #[error("credential rejected by server (401 Unauthorized)")]
    Rejected,
}
