use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use kb_api::headers::{HEADER_REFRESH_TOKEN, SESSION_COOKIE_NAME};
use kb_api::payload::TokenResponse;
use kb_api::stream::{frame_stream, search_events};
use kb_api::{HealthStatus, LoginResponse, RatingAck, RatingRequest, SearchQuery};
use kb_session::{issue_session, SERVER_SESSION_LIFETIME};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::AppState;

const EVENT_STREAM_UTF8: &str = "text/event-stream; charset=utf-8";

pub(crate) async fn login_page() -> Json<serde_json::Value> {
    Json(json!({"message": "Login endpoint mock"}))
}

pub(crate) async fn home() -> Json<serde_json::Value> {
    Json(json!({"message": "Home redirect mock"}))
}

pub(crate) async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK".to_string(),
    })
}

pub(crate) async fn unauthorized() -> Html<&'static str> {
    Html("<h1>Unauthorized</h1>")
}

pub(crate) async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(access_token) = bearer_token(&headers) else {
        return unauthorized_json("missing bearer token");
    };
    let refresh_token = header_str(&headers, HEADER_REFRESH_TOKEN)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("refresh_{access_token}"));

    let (session_id, _record) =
        issue_session(state.sessions(), access_token.clone(), OffsetDateTime::now_utc());
    let expires_in = SERVER_SESSION_LIFETIME.as_secs();
    info!(%session_id, "issued server session");

    let cookie = format!(
        "{SESSION_COOKIE_NAME}={session_id}; HttpOnly; Path=/; Max-Age={expires_in}; SameSite=Lax"
    );
    let body = LoginResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
        expires_in,
        session_id,
    };
    ([(SET_COOKIE, cookie)], Json(body)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenParams {
    #[serde(default)]
    sid: String,
}

pub(crate) async fn token(headers: HeaderMap, Query(params): Query<TokenParams>) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return unauthorized_json("missing bearer token");
    };
    Json(TokenResponse {
        valid: true,
        token,
        sid: params.sid,
    })
    .into_response()
}

pub(crate) async fn stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    if let Some(session_id) = session_cookie(&headers) {
        if state.sessions().get(&session_id).is_none() {
            warn!(%session_id, "stream requested with unknown or expired session");
            return unauthorized_json("session expired or unknown");
        }
    }

    let settings = *state.stream_settings();
    let events = search_events(&query, &settings);
    debug!(
        search_query = %query.search_query,
        frames = events.len(),
        "streaming search response"
    );

    let frames = frame_stream(events, settings.frame_delay).map(Ok::<_, Infallible>);
    (
        [(CONTENT_TYPE, EVENT_STREAM_UTF8), (CACHE_CONTROL, "no-cache")],
        Body::from_stream(frames),
    )
        .into_response()
}

pub(crate) async fn add_rating(Json(rating): Json<RatingRequest>) -> Json<RatingAck> {
    info!(chat_id = %rating.chat_id, rating = rating.rating, "rating received");
    Json(RatingAck {
        status: "success".to_string(),
        message: "Rating added successfully".to_string(),
        received_data: rating,
    })
}

fn unauthorized_json(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": detail}))).into_response()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = header_str(headers, AUTHORIZATION.as_str())?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// `codesess` value from the request's `Cookie` headers.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
}
