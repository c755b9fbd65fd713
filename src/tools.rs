use kb_api::{KbApiClient, KbApiError, SearchQuery};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const SEARCH_TOOL: &str = "search";
pub const HEALTH_CHECK_TOOL: &str = "health_check";
pub const SESSION_INFO_TOOL: &str = "session_info";

/// Conversation id sent when the caller does not supply one.
pub const DEFAULT_TOOL_SESSION_ID: &str = "vscode_session";

/// Host-callable tool definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Outcome of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub tool_name: String,
    pub is_error: bool,
    pub content: Value,
}

impl ToolResult {
    #[must_use]
    pub fn success(tool_name: impl Into<String>, content: impl Into<Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            is_error: false,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn error(tool_name: impl Into<String>, content: impl Into<Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            is_error: true,
            content: content.into(),
        }
    }

    /// Content as text, when it is a plain string.
    pub fn text(&self) -> Option<&str> {
        self.content.as_str()
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    search_query: String,
    #[serde(rename = "sessionID", default)]
    session_id: Option<String>,
    #[serde(rename = "topNDocuments", default)]
    top_n_documents: Option<u32>,
}

/// Dispatches tool calls onto a [`KbApiClient`].
#[derive(Debug, Clone)]
pub struct KbBridge {
    client: KbApiClient,
}

impl KbBridge {
    pub fn new(client: KbApiClient) -> Self {
        Self { client }
    }

    /// Bridge over a client configured from the environment.
    pub fn from_env(explicit_base_url: Option<&str>) -> Result<Self, KbApiError> {
        KbApiClient::from_env(explicit_base_url).map(Self::new)
    }

    pub fn client(&self) -> &KbApiClient {
        &self.client
    }

    pub fn tool_definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: SEARCH_TOOL.to_string(),
                description: Some(
                    "Search the knowledge base and return the streamed answer with citations."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "search_query": {"type": "string", "description": "Question to search for"},
                        "sessionID": {"type": "string", "default": DEFAULT_TOOL_SESSION_ID},
                        "topNDocuments": {
                            "type": "integer",
                            "minimum": 0,
                            "default": kb_api::payload::DEFAULT_TOP_N_DOCUMENTS,
                        },
                    },
                    "required": ["search_query"],
                }),
            },
            ToolDefinition {
                name: HEALTH_CHECK_TOOL.to_string(),
                description: Some("Check that the knowledge-base API is reachable.".to_string()),
                input_schema: json!({"type": "object", "properties": {}}),
            },
            ToolDefinition {
                name: SESSION_INFO_TOOL.to_string(),
                description: Some(
                    "Report the authentication mode and session validity.".to_string(),
                ),
                input_schema: json!({"type": "object", "properties": {}}),
            },
        ]
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        debug!(tool = name, "tool call");
        match name {
            SEARCH_TOOL => self.search(arguments).await,
            HEALTH_CHECK_TOOL => self.health_check().await,
            SESSION_INFO_TOOL => self.session_info(),
            other => ToolResult::error(other, format!("Unknown tool: {other}")),
        }
    }

    async fn search(&self, arguments: Value) -> ToolResult {
        let args: SearchArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(error) => {
                return ToolResult::error(
                    SEARCH_TOOL,
                    format!("Invalid arguments for {SEARCH_TOOL}: {error}"),
                )
            }
        };

        let mut query = SearchQuery::new(args.search_query).with_session_id(
            args.session_id
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOOL_SESSION_ID.to_string()),
        );
        if let Some(top_n) = args.top_n_documents {
            query = query.with_top_n_documents(top_n);
        }

        match self.client.search(&query).await {
            Ok(answer) => ToolResult::success(SEARCH_TOOL, answer.format()),
            Err(error) => {
                warn!(%error, "search tool failed");
                ToolResult::error(SEARCH_TOOL, self.describe_failure(&error))
            }
        }
    }

    async fn health_check(&self) -> ToolResult {
        match self.client.health().await {
            Ok(status) if status.is_ok() => ToolResult::success(
                HEALTH_CHECK_TOOL,
                format!(
                    "Knowledge-base API at {} is healthy",
                    self.client.base_url()
                ),
            ),
            Ok(status) => ToolResult::error(
                HEALTH_CHECK_TOOL,
                format!("Knowledge-base API reported status {}", status.status),
            ),
            Err(error) => ToolResult::error(HEALTH_CHECK_TOOL, self.describe_failure(&error)),
        }
    }

    fn session_info(&self) -> ToolResult {
        match serde_json::to_value(self.client.session().auth_status()) {
            Ok(status) => ToolResult::success(SESSION_INFO_TOOL, status),
            Err(error) => ToolResult::error(
                SESSION_INFO_TOOL,
                format!("Failed to serialize session status: {error}"),
            ),
        }
    }

    fn describe_failure(&self, error: &KbApiError) -> String {
        match error {
            KbApiError::Authentication(_) => format!(
                "Authentication failed: {error}. Refresh the credential cache and retry."
            ),
            KbApiError::Network(_) => format!(
                "Cannot reach knowledge-base API at {}: {error}",
                self.client.base_url()
            ),
            KbApiError::Status(status, message) => {
                format!("Knowledge-base API returned status {status}: {message}")
            }
            other => format!("Error calling knowledge-base API: {other}"),
        }
    }
}
