//! Tool-calling bridge onto the knowledge-base search API.
//!
//! [`KbBridge`] exposes the API client as three host-callable tools:
//! `search`, `health_check` and `session_info`. Definitions carry a JSON input
//! schema; every call yields a [`ToolResult`] rather than an error so a host can
//! relay failures to the model verbatim.

mod tools;

pub use kb_api;
pub use kb_session;
pub use tools::{
    KbBridge, ToolDefinition, ToolResult, DEFAULT_TOOL_SESSION_ID, HEALTH_CHECK_TOOL, SEARCH_TOOL,
    SESSION_INFO_TOOL,
};
