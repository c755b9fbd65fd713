use kb_api::sse::{decode_stream, encode_frame, encode_frames, SseStreamParser};
use kb_api::StreamEvent;
use serde_json::json;

#[test]
fn encode_frame_uses_data_prefix_and_blank_line() {
    let frame = encode_frame(&StreamEvent::Citation("22".to_string()));
    let payload = frame
        .strip_prefix("data: ")
        .and_then(|rest| rest.strip_suffix("\n\n"))
        .expect("frame should be data-prefixed and blank-line terminated");
    assert!(!payload.contains('\n'));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(payload).expect("payload should be JSON"),
        json!({"type": "citation", "data": "22"})
    );
    assert_eq!(
        SseStreamParser::parse_frames(&frame),
        vec![StreamEvent::Citation("22".to_string())]
    );
}

#[test]
fn parse_frames_skips_noise_and_undecodable_frames() {
    let input = concat!(
        ": keep-alive comment\n",
        "event: message\n",
        "data: {\"type\":\"metadata\",\"data\":{\"search_query\":\"q\"}}\n\n",
        "data: not json at all\n\n",
        "data: {\"type\":\"unknown\",\"data\":\"x\"}\n\n",
        "data: {\"type\":\"response\"}\n\n",
        "data:\n\n",
        "data:{\"type\":\"response\",\"data\":\"ok\"}\r\n\r\n",
        "data: [DONE]\n\n",
    );

    let events = SseStreamParser::parse_frames(input);
    assert_eq!(
        events,
        vec![
            StreamEvent::Metadata(json!({"search_query": "q"})),
            StreamEvent::Response("ok".to_string()),
        ]
    );
}

#[test]
fn feed_handles_multibyte_characters_split_across_chunks() {
    let frame = encode_frame(&StreamEvent::Response("héllo".to_string()));
    let bytes = frame.as_bytes();
    let split = frame.find('é').expect("accented character present") + 1;

    let mut parser = SseStreamParser::default();
    assert!(parser.feed(&bytes[..split]).is_empty());
    assert_eq!(
        parser.feed(&bytes[split..]),
        vec![StreamEvent::Response("héllo".to_string())]
    );
    assert!(parser.is_empty_buffer());
}

#[test]
fn byte_at_a_time_feeding_matches_one_shot_parse() {
    let events = vec![
        StreamEvent::Metadata(json!({"topNDocuments": 2})),
        StreamEvent::Response("abcdef".to_string()),
        StreamEvent::Response("gh".to_string()),
        StreamEvent::Citation("1".to_string()),
        StreamEvent::Citation("22".to_string()),
    ];
    let body = encode_frames(&events);

    let mut parser = SseStreamParser::default();
    let mut fed = Vec::new();
    for byte in body.as_bytes() {
        fed.extend(parser.feed(std::slice::from_ref(byte)));
    }
    fed.extend(parser.finish());

    assert_eq!(fed, events);
    assert_eq!(SseStreamParser::parse_frames(&body), events);
}

#[test]
fn decode_stream_accumulates_text_and_citations() {
    let body = encode_frames(&[
        StreamEvent::Metadata(json!({"search_query": "hello"})),
        StreamEvent::Response("hel".to_string()),
        StreamEvent::Response("lo".to_string()),
        StreamEvent::Citation("1".to_string()),
        StreamEvent::Citation("22".to_string()),
    ]);

    let answer = decode_stream(&body);
    assert_eq!(answer.text, "hello");
    assert_eq!(answer.citations, vec!["1", "22"]);
    assert_eq!(answer.metadata, Some(json!({"search_query": "hello"})));
    assert_eq!(answer.format(), "hello\n\nCitations:\n1\n22");
}

#[test]
fn decode_stream_of_garbage_is_empty() {
    let answer = decode_stream("garbage\n\ndata: {broken\n\n");
    assert!(answer.metadata.is_none());
    assert!(answer.text.is_empty());
    assert!(answer.citations.is_empty());
}
