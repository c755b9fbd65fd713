use std::time::Duration;

use futures_util::StreamExt;
use kb_api::stream::{
    answer_events, chunk_text, citation_payload, frame_stream, search_events, StreamSettings,
    DEFAULT_CITATION_CAP,
};
use kb_api::{decode_stream, SearchQuery, StreamEvent};
use serde_json::json;

#[test]
fn citation_payload_repeats_index_digits() {
    assert_eq!(citation_payload(1), "1");
    assert_eq!(citation_payload(3), "333");
    assert_eq!(citation_payload(10), "10".repeat(10));
    assert_eq!(citation_payload(0), "");
}

#[test]
fn search_events_for_short_query() {
    let query = SearchQuery::new("hello").with_top_n_documents(3);
    let events = search_events(&query, &StreamSettings::default());

    assert_eq!(
        events,
        vec![
            StreamEvent::Metadata(json!({
                "search_query": "hello",
                "topNDocuments": 3,
                "sessionID": "1234567890",
            })),
            StreamEvent::Response("hello".to_string()),
            StreamEvent::Citation("1".to_string()),
            StreamEvent::Citation("22".to_string()),
            StreamEvent::Citation("333".to_string()),
        ]
    );
}

#[test]
fn response_fragments_are_six_characters_wide() {
    let query = SearchQuery::new("the quick brown fox").with_top_n_documents(0);
    let events = search_events(&query, &StreamSettings::default());

    let fragments: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::Response(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(fragments, vec!["the qu", "ick br", "own fo", "x"]);
    assert!(!events
        .iter()
        .any(|event| matches!(event, StreamEvent::Citation(_))));
}

#[test]
fn chunked_answer_reassembles_through_decoder() {
    let fragments = chunk_text("abcdefgh", 6);
    assert_eq!(fragments, vec!["abcdef", "gh"]);
    assert_eq!(fragments.concat(), "abcdefgh");

    let query = SearchQuery::new("abcdefgh").with_top_n_documents(0);
    let body = kb_api::sse::encode_frames(&search_events(&query, &StreamSettings::default()));
    assert_eq!(decode_stream(&body).text, "abcdefgh");
}

#[test]
fn citations_are_capped() {
    let query = SearchQuery::new("q").with_top_n_documents(50);
    let events = search_events(&query, &StreamSettings::default());
    let citations = events
        .iter()
        .filter(|event| matches!(event, StreamEvent::Citation(_)))
        .count();
    assert_eq!(citations, DEFAULT_CITATION_CAP as usize);
    assert_eq!(
        events.last(),
        Some(&StreamEvent::Citation(citation_payload(DEFAULT_CITATION_CAP)))
    );
}

#[test]
fn empty_answer_emits_metadata_and_citations_only() {
    let query = SearchQuery::new("ignored").with_top_n_documents(1);
    let events = answer_events(&query, "", &StreamSettings::default());
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind(), "metadata");
    assert_eq!(events[1], StreamEvent::Citation("1".to_string()));
}

#[tokio::test]
async fn frame_stream_round_trips_through_consumer() {
    let query = SearchQuery::new("streamed answer text").with_top_n_documents(2);
    let settings = StreamSettings::default().with_frame_delay(Duration::from_millis(1));
    let frames: Vec<String> = frame_stream(search_events(&query, &settings), settings.frame_delay)
        .collect()
        .await;

    assert_eq!(frames.len(), 1 + 4 + 2);
    assert!(frames.iter().all(|frame| frame.starts_with("data: ")));
    assert!(frames.iter().all(|frame| frame.ends_with("\n\n")));

    let answer = decode_stream(&frames.concat());
    assert_eq!(answer.text, "streamed answer text");
    assert_eq!(answer.citations, vec!["1", "22"]);
}
