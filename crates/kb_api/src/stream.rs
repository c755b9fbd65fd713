use std::time::Duration;

use futures_util::stream::{self, Stream, StreamExt};
use serde_json::json;

use crate::events::StreamEvent;
use crate::payload::SearchQuery;
use crate::sse::encode_frame;

pub const DEFAULT_CHUNK_WIDTH: usize = 6;
pub const DEFAULT_CITATION_CAP: u32 = 10;

/// Shape of a produced search stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    /// Characters per response fragment. Zero is treated as one.
    pub chunk_width: usize,
    /// Upper bound on emitted citations regardless of the requested count.
    pub citation_cap: u32,
    /// Pause between consecutive frames.
    pub frame_delay: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            chunk_width: DEFAULT_CHUNK_WIDTH,
            citation_cap: DEFAULT_CITATION_CAP,
            frame_delay: Duration::ZERO,
        }
    }
}

impl StreamSettings {
    pub fn with_chunk_width(mut self, chunk_width: usize) -> Self {
        self.chunk_width = chunk_width;
        self
    }

    pub fn with_citation_cap(mut self, citation_cap: u32) -> Self {
        self.citation_cap = citation_cap;
        self
    }

    pub fn with_frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = frame_delay;
        self
    }

    /// Number of citations emitted for a request of `requested`.
    pub fn citation_count(&self, requested: u32) -> u32 {
        requested.min(self.citation_cap)
    }
}

/// Citation body `i`: the decimal digits of `i` repeated `i` times.
pub fn citation_payload(index: u32) -> String {
    index.to_string().repeat(index as usize)
}

/// Split `text` into consecutive fragments of `width` characters.
pub fn chunk_text(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Event sequence answering `query` with `answer`.
///
/// One metadata event echoing the query, then `answer` as response
/// fragments, then citations `1..=min(topNDocuments, cap)`.
pub fn answer_events(query: &SearchQuery, answer: &str, settings: &StreamSettings) -> Vec<StreamEvent> {
    let metadata = json!({
        "search_query": query.search_query,
        "topNDocuments": query.top_n_documents,
        "sessionID": query.session_id,
    });

    let mut events = vec![StreamEvent::Metadata(metadata)];
    events.extend(
        chunk_text(answer, settings.chunk_width)
            .into_iter()
            .map(StreamEvent::Response),
    );
    events.extend(
        (1..=settings.citation_count(query.top_n_documents))
            .map(|index| StreamEvent::Citation(citation_payload(index))),
    );
    events
}

/// Event sequence for the mock search: the answer text echoes the query.
pub fn search_events(query: &SearchQuery, settings: &StreamSettings) -> Vec<StreamEvent> {
    answer_events(query, &query.search_query, settings)
}

/// Encoded frames, yielded one at a time with `delay` between them.
pub fn frame_stream(
    events: Vec<StreamEvent>,
    delay: Duration,
) -> impl Stream<Item = String> + Send + 'static {
    stream::iter(events.into_iter().enumerate()).then(move |(index, event)| async move {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        encode_frame(&event)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_count_characters_not_bytes() {
        assert_eq!(chunk_text("héllo wörld!", 6), vec!["héllo ", "wörld!"]);
        assert_eq!(chunk_text("abc", 0), vec!["a", "b", "c"]);
        assert!(chunk_text("", 6).is_empty());
    }

    #[test]
    fn citation_count_respects_cap() {
        let settings = StreamSettings::default();
        assert_eq!(settings.citation_count(3), 3);
        assert_eq!(settings.citation_count(50), DEFAULT_CITATION_CAP);
        assert_eq!(settings.with_citation_cap(2).citation_count(5), 2);
    }
}
