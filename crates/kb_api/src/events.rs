use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One frame of a streaming search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Echoed query parameters; always the first frame.
    Metadata(Value),
    /// Answer fragment, concatenated in order by consumers.
    Response(String),
    /// One citation body.
    Citation(String),
}

impl StreamEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Metadata(_) => "metadata",
            Self::Response(_) => "response",
            Self::Citation(_) => "citation",
        }
    }

    /// Wire JSON for this event.
    pub fn to_json(&self) -> Value {
        let data = match self {
            Self::Metadata(data) => data.clone(),
            Self::Response(text) | Self::Citation(text) => Value::String(text.clone()),
        };
        json!({"type": self.kind(), "data": data})
    }
}

/// Decoded search result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchAnswer {
    pub metadata: Option<Value>,
    pub text: String,
    pub citations: Vec<String>,
}

impl SearchAnswer {
    pub fn from_events(events: impl IntoIterator<Item = StreamEvent>) -> Self {
        let mut answer = Self::default();
        for event in events {
            answer.apply(event);
        }
        answer
    }

    /// Fold one event in. Only the first metadata event is kept.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Metadata(value) => {
                if self.metadata.is_none() {
                    self.metadata = Some(value);
                }
            }
            StreamEvent::Response(fragment) => self.text.push_str(&fragment),
            StreamEvent::Citation(citation) => self.citations.push(citation),
        }
    }

    /// Answer text followed by a citations section when there are any.
    pub fn format(&self) -> String {
        if self.citations.is_empty() {
            return self.text.clone();
        }
        format!("{}\n\nCitations:\n{}", self.text, self.citations.join("\n"))
    }
}
