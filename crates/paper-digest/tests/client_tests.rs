//! Mock-based client tests using wiremock.
//!
//! Attempt counts are checked with `expect(n)`, which wiremock verifies when the
//! mock server is dropped.

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paper_digest::client::summary::fallback_output;
use paper_digest::client::{FeedClient, FeedSource, GraphClient, SummaryClient};
use paper_digest::config::Config;
use paper_digest::error::DigestError;
use paper_digest::models::{DEGRADED_TITLE, SourceName, SummaryInput};

const GEMINI_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

const GOOD_SUMMARY: &str = "Summary:\nA study of attention.\n\n\
Key Points:\n- Attention is enough.\n- Recurrence is dropped.\n\n\
Keywords:\n- attention\n- transformer\n";

fn graph_client(mock_server: &MockServer) -> GraphClient {
    GraphClient::new(&Config::for_testing(&mock_server.uri())).unwrap()
}

fn feed_client(mock_server: &MockServer) -> FeedClient {
    FeedClient::new(&Config::for_testing(&mock_server.uri())).unwrap()
}

fn summary_client(mock_server: &MockServer) -> SummaryClient {
    SummaryClient::new(&Config::for_testing(&mock_server.uri())).unwrap()
}

fn sample_graph_paper() -> serde_json::Value {
    json!({
        "paperId": "abc123",
        "title": "Locality in Syntax",
        "abstract": "We study locality.",
        "tldr": {"model": "tldr@v2.0.0", "text": "Locality matters."},
        "authors": [{"authorId": "1", "name": "Jane Doe"}, {"authorId": "2", "name": "John Roe"}],
        "publicationDate": "1997-03-01",
        "externalIds": {"DOI": "10.1017/S0022226797006889"}
    })
}

fn atom_feed(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, title, summary)| {
            format!(
                "<entry><id>http://arxiv.org/abs/{id}</id><title>{title}</title>\
                 <summary>{summary}</summary><published>2017-06-12T17:57:34Z</published>\
                 <author><name>Ashish Vaswani</name></author></entry>"
            )
        })
        .collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><feed xmlns="http://www.w3.org/2005/Atom"><title>q</title>{body}</feed>"#)
}

fn gemini_response(text: &str) -> serde_json::Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]})
}

// =============================================================================
// GraphClient Tests
// =============================================================================

#[tokio::test]
async fn test_graph_fetch_by_doi() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/DOI:10.1017/S0022226797006889"))
        .and(query_param("fields", "title,authors,abstract,tldr,publicationDate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_graph_paper()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let record = graph_client(&mock_server)
        .fetch_by_id("10.1017/S0022226797006889")
        .await
        .unwrap();

    assert_eq!(record.identifier, "10.1017/S0022226797006889");
    assert_eq!(record.title, "Locality in Syntax");
    assert_eq!(record.authors, vec!["Jane Doe", "John Roe"]);
    assert_eq!(record.r#abstract.as_deref(), Some("We study locality."));
    assert_eq!(record.short_summary.as_deref(), Some("Locality matters."));
    assert_eq!(record.source, SourceName::Graph);
}

#[tokio::test]
async fn test_graph_server_errors_exhaust_three_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/DOI:10.1/x"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let started = Instant::now();
    let record = graph_client(&mock_server).fetch_by_id("10.1/x").await.unwrap();

    assert!(record.is_degraded());
    assert_eq!(record.title, DEGRADED_TITLE);
    assert_eq!(record.identifier, "10.1/x");
    // Two 10ms gaps between three attempts.
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn test_graph_payload_without_content_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/DOI:10.1/x"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"title": "Bare", "abstract": null})),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/DOI:10.1/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_graph_paper()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let record = graph_client(&mock_server).fetch_by_id("10.1/x").await.unwrap();
    assert!(!record.is_degraded());
    assert_eq!(record.title, "Locality in Syntax");
}

#[tokio::test]
async fn test_graph_malformed_json_degrades() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let record = graph_client(&mock_server).fetch_by_id("10.1/x").await.unwrap();
    assert!(record.is_degraded());
}

#[tokio::test]
async fn test_graph_404_is_not_found_and_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Paper not found"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = graph_client(&mock_server).fetch_by_id("10.1/missing").await.unwrap_err();
    assert!(matches!(err, DigestError::NotFound { ref id } if id == "10.1/missing"));
}

#[tokio::test]
async fn test_graph_blank_id_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_graph_paper()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = graph_client(&mock_server).fetch_by_id("   ").await.unwrap_err();
    assert!(matches!(err, DigestError::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_graph_sends_api_key_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(wiremock::matchers::header("x-api-key", "s2-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_graph_paper()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Config {
        semantic_scholar_api_key: Some("s2-key".to_string()),
        ..Config::for_testing(&mock_server.uri())
    };
    let client = GraphClient::new(&config).unwrap();
    assert!(client.has_api_key());

    let record = client.fetch_by_id("10.1/x").await.unwrap();
    assert!(!record.is_degraded());
}

// =============================================================================
// FeedClient Tests
// =============================================================================

#[tokio::test]
async fn test_feed_default_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("search_query", "machine learning"))
        .and(query_param("start", "0"))
        .and(query_param("max_results", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_string(atom_feed(&[
            ("2301.07041v1", "First", "One."),
            ("2302.00001v2", "Second", "Two."),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = feed_client(&mock_server).fetch_by_query(None).await.unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, vec!["2301.07041v1", "2302.00001v2"]);
    assert!(records.iter().all(|r| r.source == SourceName::Feed));
    assert_eq!(records[0].authors, vec!["Ashish Vaswani"]);
}

#[tokio::test]
async fn test_feed_custom_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("search_query", "graph neural networks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(atom_feed(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records =
        feed_client(&mock_server).fetch_by_query(Some("graph neural networks")).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_feed_exhausts_ten_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(10)
        .mount(&mock_server)
        .await;

    let started = Instant::now();
    let err = feed_client(&mock_server).fetch_by_query(Some("x")).await.unwrap_err();

    assert!(matches!(err, DigestError::UpstreamUnavailable { ref upstream, .. } if upstream == "arXiv"));
    assert!(started.elapsed() >= Duration::from_millis(90));
}

#[tokio::test]
async fn test_feed_recovers_after_transient_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(4)
        .expect(4)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(atom_feed(&[("1706.03762v7", "T", "S")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = feed_client(&mock_server).fetch_by_query(None).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_feed_fetch_by_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("id_list", "1706.03762"))
        .and(query_param("max_results", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(atom_feed(&[(
            "1706.03762v7",
            "Attention Is All You Need",
            "The dominant sequence transduction models.",
        )])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = feed_client(&mock_server);

    let record = client.fetch_by_id("arXiv:1706.03762").await.unwrap();
    assert_eq!(record.identifier, "1706.03762v7");
    assert_eq!(record.title, "Attention Is All You Need");

    let abstract_record = client.fetch_abstract("1706.03762").await.unwrap();
    assert_eq!(abstract_record.identifier, "1706.03762v7");
    assert_eq!(abstract_record.r#abstract, "The dominant sequence transduction models.");
}

#[tokio::test]
async fn test_feed_fetch_by_id_empty_result_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(atom_feed(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = feed_client(&mock_server).fetch_by_id("2999.99999").await.unwrap_err();
    assert!(matches!(err, DigestError::NotFound { .. }));
}

#[tokio::test]
async fn test_feed_blank_id_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(atom_feed(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = feed_client(&mock_server).fetch_by_id("").await.unwrap_err();
    assert!(matches!(err, DigestError::InvalidArgument { .. }));
}

// =============================================================================
// SummaryClient Tests
// =============================================================================

fn summary_input() -> SummaryInput {
    SummaryInput::new(Some("We study attention.".to_string()), None)
}

#[tokio::test]
async fn test_summary_success_sends_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(GOOD_SUMMARY)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = summary_client(&mock_server).summarize(&summary_input()).await;
    assert_eq!(output.as_str(), GOOD_SUMMARY);
}

#[tokio::test]
async fn test_summary_placeholder_output_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(
            "Summary:\nx\n\nKey Points:\n- [Point 1]\n\nKeywords:\n- [Keyword 1]\n",
        )))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(GOOD_SUMMARY)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = summary_client(&mock_server).summarize(&summary_input()).await;
    assert_eq!(output.as_str(), GOOD_SUMMARY);
}

#[tokio::test]
async fn test_summary_bracketed_content_is_accepted() {
    let mock_server = MockServer::start().await;
    let text = "Summary:\nRegistration of scans.\n\nKey Points:\n- [Point cloud] registration is studied\n\nKeywords:\n- registration\n";

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(text)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = summary_client(&mock_server).summarize(&summary_input()).await;
    assert_eq!(output.as_str(), text);
}

#[tokio::test]
async fn test_summary_prose_mention_of_key_points_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(
            "Summary:\nThe key points are listed below.\n\nKeywords:\n- k\n",
        )))
        .expect(3)
        .mount(&mock_server)
        .await;

    let output = summary_client(&mock_server).summarize(&summary_input()).await;
    assert_eq!(output, fallback_output());
}

#[tokio::test]
async fn test_summary_missing_key_points_falls_back_after_three_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_response("Summary:\nOnly prose.\n\nKeywords:\n- k\n")),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let output = summary_client(&mock_server).summarize(&summary_input()).await;
    assert_eq!(output, fallback_output());
}

#[tokio::test]
async fn test_summary_server_errors_fall_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let started = Instant::now();
    let output = summary_client(&mock_server).summarize(&summary_input()).await;

    assert_eq!(output, fallback_output());
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn test_summary_without_key_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(GOOD_SUMMARY)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Config { gemini_api_key: None, ..Config::for_testing(&mock_server.uri()) };
    let client = SummaryClient::new(&config).unwrap();
    assert!(!client.has_api_key());

    let output = client.summarize(&summary_input()).await;
    assert_eq!(output, fallback_output());
}

#[tokio::test]
async fn test_summary_empty_input_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_response(GOOD_SUMMARY)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let output = summary_client(&mock_server).summarize(&SummaryInput::new(None, None)).await;
    assert_eq!(output, fallback_output());
}

// =============================================================================
// Client Construction Tests
// =============================================================================

#[test]
fn test_client_debug_hides_keys() {
    let config = Config::new(Some("gemini-secret".to_string()), Some("s2-secret".to_string()));

    let graph = GraphClient::new(&config).unwrap();
    let summary = SummaryClient::new(&config).unwrap();

    let debug = format!("{graph:?} {summary:?} {config:?}");
    assert!(!debug.contains("gemini-secret"));
    assert!(!debug.contains("s2-secret"));
    assert!(debug.contains("has_api_key"));
}
