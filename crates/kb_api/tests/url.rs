use kb_api::url::{endpoint_url, search_endpoint};
use kb_api::{KbApiError, SearchQuery};

#[test]
fn endpoint_url_joins_with_single_slash() {
    assert_eq!(
        endpoint_url("http://127.0.0.1:8000/", "/health").expect("valid url"),
        "http://127.0.0.1:8000/health"
    );
    assert_eq!(
        endpoint_url("https://codesentinel.example.net/api", "add_rating").expect("valid url"),
        "https://codesentinel.example.net/api/add_rating"
    );
    assert_eq!(
        endpoint_url("http://localhost:8000", "").expect("valid url"),
        "http://localhost:8000"
    );
}

#[test]
fn endpoint_url_rejects_non_http_bases() {
    for base in ["", "not a url", "ftp://example.com"] {
        let error = endpoint_url(base, "health").expect_err("base should be rejected");
        assert!(matches!(error, KbApiError::InvalidBaseUrl(_)));
    }
}

#[test]
fn search_endpoint_encodes_query_parameters() {
    let query = SearchQuery::new("a&b c")
        .with_top_n_documents(3)
        .with_session_id("s/1");
    assert_eq!(
        search_endpoint(&query),
        "stream?search_query=a%26b+c&topNDocuments=3&sessionID=s%2F1"
    );
}
