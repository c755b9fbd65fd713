use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N_DOCUMENTS: u32 = 5;
pub const DEFAULT_SESSION_ID: &str = "1234567890";

/// Query string of the streaming search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub search_query: String,
    #[serde(rename = "topNDocuments", default = "default_top_n")]
    pub top_n_documents: u32,
    #[serde(rename = "sessionID", default = "default_session_id")]
    pub session_id: String,
}

fn default_top_n() -> u32 {
    DEFAULT_TOP_N_DOCUMENTS
}

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

impl SearchQuery {
    pub fn new(search_query: impl Into<String>) -> Self {
        Self {
            search_query: search_query.into(),
            top_n_documents: DEFAULT_TOP_N_DOCUMENTS,
            session_id: DEFAULT_SESSION_ID.to_string(),
        }
    }

    pub fn with_top_n_documents(mut self, top_n_documents: u32) -> Self {
        self.top_n_documents = top_n_documents;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub chat_id: String,
    pub search_query: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAck {
    pub status: String,
    pub message: String,
    pub received_data: RatingRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Body of a successful `/api/login` exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub session_id: String,
}

/// Body of `/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub valid: bool,
    pub token: String,
    pub sid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_uses_wire_parameter_names() {
        let query = SearchQuery::new("hello").with_top_n_documents(3);
        let value = serde_json::to_value(&query).expect("query should serialize");
        assert_eq!(value["search_query"], "hello");
        assert_eq!(value["topNDocuments"], 3);
        assert_eq!(value["sessionID"], DEFAULT_SESSION_ID);
    }

    #[test]
    fn search_query_defaults_missing_parameters() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"search_query":"q"}"#).expect("query should parse");
        assert_eq!(query, SearchQuery::new("q"));
    }
}
