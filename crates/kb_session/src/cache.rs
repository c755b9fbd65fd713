use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::FallbackReason;
use crate::mode::AuthMode;
use crate::session::Session;

/// Credential record persisted by the external login tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialCache {
    #[serde(default)]
    pub cookie: Option<String>,
    /// ISO-8601 timestamp; offset-less values are interpreted as UTC.
    #[serde(default)]
    pub expiry: Option<String>,
    /// Free-form profile object; absent or `null` reads as `{}`.
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub user_info: Value,
}

impl Default for CredentialCache {
    fn default() -> Self {
        Self {
            cookie: None,
            expiry: None,
            user_info: empty_object(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(if value.is_null() { empty_object() } else { value })
}

impl CredentialCache {
    pub fn load(path: &Path) -> Result<Self, FallbackReason> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                return Err(FallbackReason::CacheMissing {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => return Err(FallbackReason::unreadable(path, source)),
        };

        serde_json::from_str(&contents).map_err(|source| FallbackReason::malformed(path, source))
    }

    /// Turn the cached record into a cookie-mode session.
    ///
    /// The expiry must be strictly in the future. The five minute validity
    /// buffer is not applied here; a cookie about to expire still yields a
    /// cookie-mode session that reports itself invalid.
    pub fn into_session(self, path: &Path, now: OffsetDateTime) -> Result<Session, FallbackReason> {
        let raw_expiry = self
            .expiry
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| FallbackReason::MissingExpiry {
                path: path.to_path_buf(),
            })?;
        let expiry = parse_expiry(raw_expiry).ok_or_else(|| FallbackReason::InvalidExpiry {
            path: path.to_path_buf(),
            value: raw_expiry.to_string(),
        })?;

        if expiry <= now {
            return Err(FallbackReason::Expired {
                expiry: raw_expiry.to_string(),
            });
        }

        let cookie = self
            .cookie
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| FallbackReason::EmptyCookie {
                path: path.to_path_buf(),
            })?;

        Ok(Session::new(AuthMode::Cookie, cookie, expiry))
    }
}

/// Read the cache at `path` and build a cookie-mode session from it.
pub fn init_cookie_session(path: &Path, now: OffsetDateTime) -> Result<Session, FallbackReason> {
    CredentialCache::load(path)?.into_session(path, now)
}

/// Parse an ISO-8601 timestamp, with or without a UTC offset.
pub fn parse_expiry(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }
    if let Ok(parsed) = OffsetDateTime::parse(value, &Iso8601::DEFAULT) {
        return Some(parsed);
    }

    let naive = PrimitiveDateTime::parse(value, &Iso8601::DEFAULT)
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            )
        })
        .ok()?;

    Some(naive.assume_utc())
}
