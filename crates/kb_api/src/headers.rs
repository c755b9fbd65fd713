use std::collections::BTreeMap;

use kb_session::AuthMode;

use crate::config::KbApiConfig;
use crate::error::KbApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_COOKIE: &str = "cookie";
pub const HEADER_USER_AGENT: &str = "user-agent";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_REFRESH_TOKEN: &str = "x-refresh-token";

/// Cookie carrying the production credential.
pub const AUTH_COOKIE_NAME: &str = "AppServiceAuthSession";
/// Cookie set by the login endpoint.
pub const SESSION_COOKIE_NAME: &str = "codesess";

pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Build a deterministic header map for an authenticated request.
///
/// Cookie mode attaches `credential` as the auth cookie; mock mode sends no
/// credential header at all.
pub fn build_headers(
    mode: AuthMode,
    credential: &str,
    config: &KbApiConfig,
    streaming: bool,
) -> Result<BTreeMap<String, String>, KbApiError> {
    let mut headers = BTreeMap::new();

    if mode == AuthMode::Cookie {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(KbApiError::MissingCredential);
        }
        headers.insert(
            HEADER_COOKIE.to_owned(),
            format!("{AUTH_COOKIE_NAME}={credential}"),
        );
    }

    headers.insert(HEADER_CONTENT_TYPE.to_owned(), JSON_CONTENT_TYPE.to_owned());
    if streaming {
        headers.insert(
            HEADER_ACCEPT.to_owned(),
            EVENT_STREAM_CONTENT_TYPE.to_owned(),
        );
    }
    headers.insert(HEADER_USER_AGENT.to_owned(), config.resolved_user_agent());

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

/// Value of cookie `name` from a `Set-Cookie` header line.
pub fn set_cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    let pair = header.split(';').next()?.trim();
    let (key, value) = pair.split_once('=')?;
    (key.trim() == name).then(|| value.trim())
}
