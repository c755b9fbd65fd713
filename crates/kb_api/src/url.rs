use url::form_urlencoded;

use crate::error::KbApiError;
use crate::payload::SearchQuery;

pub const SEARCH_PATH: &str = "stream";
pub const HEALTH_PATH: &str = "health";
pub const RATING_PATH: &str = "add_rating";
pub const LOGIN_PATH: &str = "api/login";

/// Join `base_url` and `endpoint` with exactly one slash between them.
///
/// `endpoint` may carry a query string. The base must be an absolute
/// `http`/`https` URL.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> Result<String, KbApiError> {
    let base = base_url.trim().trim_end_matches('/');
    let parsed =
        url::Url::parse(base).map_err(|_| KbApiError::InvalidBaseUrl(base_url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(KbApiError::InvalidBaseUrl(base_url.to_string()));
    }

    let endpoint = endpoint.trim().trim_start_matches('/');
    if endpoint.is_empty() {
        return Ok(base.to_string());
    }
    Ok(format!("{base}/{endpoint}"))
}

/// Relative search endpoint with the query string encoded.
pub fn search_endpoint(query: &SearchQuery) -> String {
    let encoded = form_urlencoded::Serializer::new(String::new())
        .append_pair("search_query", &query.search_query)
        .append_pair("topNDocuments", &query.top_n_documents.to_string())
        .append_pair("sessionID", &query.session_id)
        .finish();
    format!("{SEARCH_PATH}?{encoded}")
}
