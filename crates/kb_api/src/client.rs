use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::StreamExt;
use kb_session::{AuthError, SessionManager};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::KbApiConfig;
use crate::error::{parse_error_message, KbApiError};
use crate::events::{SearchAnswer, StreamEvent};
use crate::headers::{
    build_headers, set_cookie_value, HEADER_AUTHORIZATION, HEADER_REFRESH_TOKEN,
    HEADER_USER_AGENT, SESSION_COOKIE_NAME,
};
use crate::payload::{HealthStatus, LoginResponse, RatingAck, RatingRequest, SearchQuery};
use crate::sse::SseStreamParser;
use crate::url::{endpoint_url, search_endpoint, HEALTH_PATH, LOGIN_PATH, RATING_PATH};

/// HTTP client that authenticates every request through a [`SessionManager`].
///
/// Requests are sent exactly once. A 401 response invalidates a cookie session
/// and surfaces as [`KbApiError::Authentication`]; connection failures surface
/// as [`KbApiError::Network`].
#[derive(Debug, Clone)]
pub struct KbApiClient {
    http: Client,
    session: Arc<SessionManager>,
    config: KbApiConfig,
}

/// Result of the login exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub response: LoginResponse,
    /// Value of the `codesess` cookie the server set.
    pub session_cookie: String,
}

impl KbApiClient {
    pub fn new(session: SessionManager, config: KbApiConfig) -> Result<Self, KbApiError> {
        Self::with_shared_session(Arc::new(session), config)
    }

    pub fn with_shared_session(
        session: Arc<SessionManager>,
        config: KbApiConfig,
    ) -> Result<Self, KbApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(KbApiError::from)?;
        Ok(Self {
            http,
            session,
            config,
        })
    }

    /// Session from the environment with default transport settings.
    pub fn from_env(explicit_base_url: Option<&str>) -> Result<Self, KbApiError> {
        Self::new(
            SessionManager::from_env(explicit_base_url),
            KbApiConfig::default(),
        )
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn config(&self) -> &KbApiConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    pub fn endpoint_url(&self, endpoint: &str) -> Result<String, KbApiError> {
        endpoint_url(self.session.base_url(), endpoint)
    }

    pub fn build_headers(&self, credential: &str, streaming: bool) -> Result<HeaderMap, KbApiError> {
        let headers = build_headers(self.session.mode(), credential, &self.config, streaming)?;
        to_header_map(headers)
    }

    /// Send one authenticated request and return the successful response.
    ///
    /// Only `GET` and `POST` are supported. The body, when given, is sent as
    /// JSON.
    pub async fn authenticated_request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        streaming: bool,
    ) -> Result<Response, KbApiError> {
        if method != Method::GET && method != Method::POST {
            return Err(KbApiError::UnsupportedMethod(method.to_string()));
        }

        let credential = self.session.authenticate()?;
        let url = self.endpoint_url(endpoint)?;
        let headers = self.build_headers(&credential, streaming)?;

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, %url, mode = self.session.mode().as_str(), "sending request");
        let response = request.send().await.map_err(|source| {
            error!(%method, %url, error = %source, "request failed before a response");
            KbApiError::Network(source)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(%url, "server rejected the session credential");
            return Err(KbApiError::Authentication(self.session.reject()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_message(status, &body);
            warn!(%url, %status, %message, "request returned an error status");
            return Err(KbApiError::Status(status, message));
        }

        Ok(response)
    }

    /// Run a search and hand each decoded event to `on_event` as it arrives.
    pub async fn search_with_handler<F>(
        &self,
        query: &SearchQuery,
        mut on_event: F,
    ) -> Result<SearchAnswer, KbApiError>
    where
        F: FnMut(&StreamEvent),
    {
        let response = self
            .authenticated_request(&search_endpoint(query), Method::GET, None, true)
            .await?;
        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();
        let mut answer = SearchAnswer::default();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(KbApiError::from)?;
            for event in parser.feed(&chunk) {
                on_event(&event);
                answer.apply(event);
            }
        }
        for event in parser.finish() {
            on_event(&event);
            answer.apply(event);
        }

        Ok(answer)
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchAnswer, KbApiError> {
        self.search_with_handler(query, |_| {}).await
    }

    pub async fn health(&self) -> Result<HealthStatus, KbApiError> {
        let response = self
            .authenticated_request(HEALTH_PATH, Method::GET, None, false)
            .await?;
        read_json(response).await
    }

    pub async fn add_rating(&self, rating: &RatingRequest) -> Result<RatingAck, KbApiError> {
        let body = serde_json::to_value(rating)?;
        let response = self
            .authenticated_request(RATING_PATH, Method::POST, Some(&body), false)
            .await?;
        read_json(response).await
    }

    /// Exchange bearer tokens for a server session.
    ///
    /// This does not go through the session manager; a 401 here reports a bad
    /// bearer token and leaves the held session alone.
    pub async fn login(
        &self,
        bearer_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<LoginSession, KbApiError> {
        let url = self.endpoint_url(LOGIN_PATH)?;
        let headers = self.build_login_headers(bearer_token, refresh_token)?;

        let response = self
            .http
            .post(&url)
            .headers(headers)
            .send()
            .await
            .map_err(KbApiError::Network)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(KbApiError::Authentication(AuthError::Rejected));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KbApiError::Status(status, parse_error_message(status, &body)));
        }

        let session_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| set_cookie_value(value, SESSION_COOKIE_NAME))
            .map(str::to_owned)
            .ok_or(KbApiError::MissingSessionCookie)?;
        let response: LoginResponse = read_json(response).await?;

        debug!(session_id = %response.session_id, "login established a server session");
        Ok(LoginSession {
            response,
            session_cookie,
        })
    }

    fn build_login_headers(
        &self,
        bearer_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<HeaderMap, KbApiError> {
        let mut headers = BTreeMap::new();
        let bearer_token = bearer_token.trim();
        if !bearer_token.is_empty() {
            headers.insert(
                HEADER_AUTHORIZATION.to_owned(),
                format!("Bearer {bearer_token}"),
            );
        }
        if let Some(refresh) = refresh_token.map(str::trim).filter(|value| !value.is_empty()) {
            headers.insert(HEADER_REFRESH_TOKEN.to_owned(), refresh.to_owned());
        }
        headers.insert(
            HEADER_USER_AGENT.to_owned(),
            self.config.resolved_user_agent(),
        );
        for (key, value) in &self.config.extra_headers {
            headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
        }
        to_header_map(headers)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, KbApiError> {
    let body = response.text().await.map_err(KbApiError::from)?;
    serde_json::from_str(&body).map_err(KbApiError::from)
}

fn to_header_map(headers: BTreeMap<String, String>) -> Result<HeaderMap, KbApiError> {
    let mut out = HeaderMap::new();
    for (key, value) in headers {
        out.insert(
            HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| KbApiError::InvalidHeader(format!("invalid header key: {key}")))?,
            HeaderValue::from_str(&value)
                .map_err(|_| KbApiError::InvalidHeader(format!("invalid header value for {key}")))?,
        );
    }
    Ok(out)
}
