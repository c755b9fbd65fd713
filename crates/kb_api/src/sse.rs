use tracing::debug;

use crate::events::{SearchAnswer, StreamEvent};

/// Encode one event as an SSE frame: `data: <JSON>\n\n`.
pub fn encode_frame(event: &StreamEvent) -> String {
    format!("data: {}\n\n", event.to_json())
}

/// Concatenated frames for a whole event sequence.
pub fn encode_frames<'a>(events: impl IntoIterator<Item = &'a StreamEvent>) -> String {
    events.into_iter().map(encode_frame).collect()
}

/// Incremental line-oriented parser for SSE search streams.
///
/// Bytes may arrive split at any point, including inside a multi-byte
/// character; only complete lines are decoded. Lines without a `data:` prefix,
/// blank payloads, `[DONE]` markers and frames whose JSON does not decode to a
/// known event are skipped.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to contain no newline.
    scanned: usize,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    ///
    /// Consumed lines are removed from the buffer once per call, so only the
    /// trailing partial line is retained between calls.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        let mut start = 0;
        let mut cursor = self.scanned;

        while let Some(offset) = self.buffer[cursor..].iter().position(|byte| *byte == b'\n') {
            let end = cursor + offset;
            if let Some(event) = parse_line(&self.buffer[start..=end]) {
                events.push(event);
            }
            start = end + 1;
            cursor = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();
        events
    }

    /// Decode whatever is left in the buffer as a final unterminated line.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        parse_line(&rest).into_iter().collect()
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<StreamEvent> {
        let mut parser = Self::default();
        let mut events = parser.feed(input.as_bytes());
        events.extend(parser.finish());
        events
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.iter().all(u8::is_ascii_whitespace)
    }
}

/// Parse a complete SSE body into an accumulated answer.
pub fn decode_stream(input: &str) -> SearchAnswer {
    SearchAnswer::from_events(SseStreamParser::parse_frames(input))
}

fn parse_line(line: &[u8]) -> Option<StreamEvent> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\n', '\r']);
    let payload = line.strip_prefix("data:")?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    if payload.trim().is_empty() || payload.trim() == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(error) => {
            debug!(%error, "dropping undecodable SSE frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SseStreamParser;
    use crate::events::StreamEvent;

    #[test]
    fn parse_sse_frames_incrementally() {
        let mut parser = SseStreamParser::default();
        let mut events = Vec::new();

        events.extend(parser.feed(b"data: {\"type\":\"response\",\"da"));
        assert!(events.is_empty());
        assert!(!parser.is_empty_buffer());

        events.extend(parser.feed(b"ta\":\"Hello\"}\n\n"));
        assert_eq!(events, vec![StreamEvent::Response("Hello".to_string())]);

        events.extend(parser.feed(b"data: [DONE]\n\n"));
        assert_eq!(events.len(), 1);
        assert!(parser.is_empty_buffer());
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut parser = SseStreamParser::default();
        assert!(parser
            .feed(b"data: {\"type\":\"citation\",\"data\":\"1\"}")
            .is_empty());
        assert_eq!(
            parser.finish(),
            vec![StreamEvent::Citation("1".to_string())]
        );
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn many_frames_in_one_chunk_leave_no_residue() {
        let frame = "data: {\"type\":\"citation\",\"data\":\"7\"}\n\n";
        let mut parser = SseStreamParser::default();

        let events = parser.feed(frame.repeat(2_000).as_bytes());
        assert_eq!(events.len(), 2_000);
        assert!(parser.buffer.is_empty());
        assert_eq!(parser.scanned, 0);
    }

    #[test]
    fn long_line_split_into_small_chunks_decodes_once() {
        let text = "x".repeat(4_096);
        let frame = format!("data: {{\"type\":\"response\",\"data\":\"{text}\"}}\n");
        let mut parser = SseStreamParser::default();
        let mut events = Vec::new();

        for chunk in frame.as_bytes().chunks(7) {
            events.extend(parser.feed(chunk));
            assert_eq!(parser.scanned, parser.buffer.len());
        }

        assert_eq!(events, vec![StreamEvent::Response(text)]);
        assert!(parser.buffer.is_empty());
    }
}
