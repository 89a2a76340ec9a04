//! Tests for the exchange-rate fetch against a mock HTTP server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ted_extractor::currency::{fetch_rates_with, ExchangeRateTable};
use ted_extractor::http::{create_client, RetryPolicy};
use ted_extractor::node::FieldValue;
use ted_extractor::schema::OutputSchema;
use ted_extractor::{ExtractorError, Pipeline, Result};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RATES_PATH: &str = "/latest";

fn no_wait(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::ZERO,
    }
}

fn packages_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("packages")
}

/// Run a blocking fetch off the async runtime.
async fn fetch(url: String, policy: RetryPolicy) -> Result<ExchangeRateTable> {
    tokio::task::spawn_blocking(move || {
        let client = create_client()?;
        fetch_rates_with(&client, &url, policy)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_rates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "base": "EUR",
            "date": "2019-01-02",
            "rates": { "USD": 1.1357, "GBP": 0.9007, "XX": 3.0 }
        })))
        .mount(&mock_server)
        .await;

    let table = fetch(format!("{}{RATES_PATH}", mock_server.uri()), no_wait(1))
        .await
        .unwrap();

    // Invalid code is ignored
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("USD"), Some(1.1357));
    assert_eq!(table.get("GBP"), Some(0.9007));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_rates_server_error_exhausts_retries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = fetch(format!("{}{RATES_PATH}", mock_server.uri()), no_wait(3)).await;

    match result {
        Err(ExtractorError::RetriesExhausted { attempts, message }) => {
            assert_eq!(attempts, 3);
            assert!(message.contains("500"), "{message}");
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_rates_not_found_fails_at_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetch(format!("{}{RATES_PATH}", mock_server.uri()), no_wait(3)).await;

    assert!(matches!(result, Err(ExtractorError::Http(_))), "{result:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_rates_wrong_base() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "base": "USD",
            "rates": { "EUR": 0.88 }
        })))
        .mount(&mock_server)
        .await;

    let result = fetch(format!("{}{RATES_PATH}", mock_server.uri()), no_wait(1)).await;

    assert!(matches!(result, Err(ExtractorError::InvalidCurrency(_))), "{result:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_rates_malformed_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let result = fetch(format!("{}{RATES_PATH}", mock_server.uri()), no_wait(1)).await;

    assert!(matches!(result, Err(ExtractorError::Json(_))), "{result:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pipeline_converts_with_fetched_rates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "base": "EUR",
            "rates": { "USD": 1.25 }
        })))
        .mount(&mock_server)
        .await;

    let url = format!("{}{RATES_PATH}", mock_server.uri());
    let table = tokio::task::spawn_blocking(move || {
        let client = create_client()?;
        Pipeline::new(OutputSchema::ted_notice()?)
            .with_rates_from(&client, &url)
            .run(&packages_dir())
    })
    .await
    .unwrap()
    .unwrap();

    let values: Vec<_> = table
        .rows
        .iter()
        .filter_map(|r| r.get("VALUE_EUR").and_then(FieldValue::first))
        .collect();
    assert_eq!(values, vec!["200000", "150000"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pipeline_rate_failure_becomes_warning() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = format!("{}{RATES_PATH}", mock_server.uri());
    let table = tokio::task::spawn_blocking(move || {
        let client = create_client()?;
        Pipeline::new(OutputSchema::ted_notice()?)
            .with_rates_from(&client, &url)
            .run(&packages_dir())
    })
    .await
    .unwrap()
    .unwrap();

    // Rows are still produced, only the converted column is missing
    assert_eq!(table.len(), 2);
    assert!(table
        .warnings
        .iter()
        .any(|w| w.starts_with("Currency conversion skipped")));
    assert!(!table.columns.iter().any(|c| c == "VALUE_EUR"));
}
