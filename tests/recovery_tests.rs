//! End-to-end tests for the recovery facade against a mock HTTP server.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{fast_policy, MemorySink};
use errata::classify::ErrorCode;
use errata::config::ErrataConfig;
use errata::error::ErrataError;
use errata::provider::ProviderKey;
use errata::recovery::{CallEnvelope, RecoveryFacade, RequestOptions};
use errata::util::redact::MASK;

fn test_config() -> ErrataConfig {
    let mut config = ErrataConfig::default();
    config.max_requests_per_second = 100;
    config.attempt_timeout = Duration::from_secs(5);
    config.slow_down_cooldown = Duration::from_millis(20);
    config.retry.rate_limit = fast_policy(3);
    config.retry.server_error = fast_policy(2);
    config.retry.connection = fast_policy(1);
    config
}

fn facade_with_sink(config: ErrataConfig) -> (RecoveryFacade, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    let facade = RecoveryFacade::new(config).with_sink(sink.clone());
    (facade, sink)
}

fn post(server: &MockServer, route: &str) -> RequestOptions {
    RequestOptions::builder()
        .endpoint(format!("{}{route}", server.uri()))
        .body(json!({"model": "test-model", "messages": []}))
        .build()
}

#[tokio::test]
async fn rate_limit_succeeds_on_fourth_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "rate limit exceeded", "type": "requests"}
        })))
        .up_to_n_times(3)
        .with_priority(1)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "chatcmpl-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let (facade, sink) = facade_with_sink(test_config());
    let body = facade
        .call_json(&post(&server, "/v1/chat/completions"))
        .await
        .unwrap();

    assert_eq!(body, json!({"id": "chatcmpl-1"}));

    let attempts = sink.attempts();
    assert_eq!(
        attempts,
        vec![
            (1, Duration::from_millis(5), ErrorCode::RateLimit),
            (2, Duration::from_millis(10), ErrorCode::RateLimit),
            (3, Duration::from_millis(20), ErrorCode::RateLimit),
        ]
    );

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].retry_count, 3);
    assert_eq!(records[0].code, None);
}

#[tokio::test]
async fn incorrect_key_fails_fast_with_redacted_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided: sk-abcdefghijklmnopqrstuvwxyz1234.",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (facade, sink) = facade_with_sink(test_config());
    let options = post(&server, "/v1/chat/completions");
    let envelope: CallEnvelope<_> = facade.call_json(&options).await.into();

    assert!(!envelope.success);
    let analysis = envelope.error.unwrap();
    assert_eq!(analysis.code, ErrorCode::IncorrectApiKey);
    assert!(!analysis.retryable);
    assert_eq!(analysis.context.retry_count, 0);
    assert!(!analysis.raw_error_redacted.contains("sk-abcdefghij"));
    assert!(analysis.raw_error_redacted.contains(MASK));
    assert!(!analysis.user_message().contains("sk-"));

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].request_id, analysis.context.request_id);
    assert!(!records[0].raw_error.as_deref().unwrap_or("").contains("sk-abcdefghij"));
    assert!(sink.attempts().is_empty());
}

#[tokio::test]
async fn exhausted_retries_report_attempt_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(3)
        .mount(&server)
        .await;

    let (facade, sink) = facade_with_sink(test_config());
    let analysis = facade
        .call_json(&post(&server, "/v1/messages"))
        .await
        .unwrap_err();

    assert_eq!(analysis.code, ErrorCode::BadGateway);
    assert!(analysis.retryable);
    assert_eq!(analysis.context.retry_count, 2);
    assert!(
        analysis.next_step.starts_with("Retries exhausted after 3 attempts."),
        "{}",
        analysis.next_step
    );
    assert_eq!(sink.records().len(), 1);
    assert_eq!(sink.attempts().len(), 2);
}

#[tokio::test]
async fn per_attempt_deadline_is_retried_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(2)
        .mount(&server)
        .await;

    let (facade, _sink) = facade_with_sink(test_config());
    let options = RequestOptions::builder()
        .endpoint(format!("{}/v1/models", server.uri()))
        .method(reqwest::Method::GET)
        .timeout(Duration::from_millis(50))
        .build();

    let analysis = facade.call_json(&options).await.unwrap_err();
    assert_eq!(analysis.code, ErrorCode::TimeoutError);
    assert_eq!(analysis.context.retry_count, 1);
    assert_eq!(analysis.context.method, "GET");
}

#[tokio::test]
async fn cancellation_yields_cancelled_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let (facade, sink) = facade_with_sink(test_config());
    let cancel = CancellationToken::new();
    let options = RequestOptions::builder()
        .endpoint(format!("{}/v1/chat/completions", server.uri()))
        .cancel(cancel.clone())
        .build();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let analysis = facade.call_json(&options).await.unwrap_err();
    canceller.await.unwrap();

    assert!(analysis.is_cancelled());
    assert!(!analysis.retryable);
    assert_eq!(sink.records()[0].code, Some(ErrorCode::Cancelled));
}

#[tokio::test]
async fn claude_overload_derates_throttler_then_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "message"})))
        .mount(&server)
        .await;

    let (facade, sink) = facade_with_sink(test_config());
    let options = RequestOptions::builder()
        .endpoint(format!("{}/v1/messages", server.uri()))
        .provider(ProviderKey::Anthropic)
        .build();

    facade.call_json(&options).await.unwrap();

    assert_eq!(sink.attempts()[0].2, ErrorCode::ClaudeOverloaded);
    // 30% of 100, then one step back up for the success.
    assert_eq!(facade.throttler().current_rate(), 31);
}

#[tokio::test]
async fn configured_api_key_is_sent_in_provider_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-api-key", "sk-ant-test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.set_api_key(ProviderKey::Anthropic, "sk-ant-test-key");
    let (facade, _sink) = facade_with_sink(config);
    let options = RequestOptions::builder()
        .endpoint(format!("{}/v1/messages", server.uri()))
        .provider(ProviderKey::Anthropic)
        .build();

    assert_eq!(facade.call_json(&options).await.unwrap(), json!({"ok": true}));
}

#[tokio::test]
async fn arbitrary_operations_are_classified_from_upstream_values() {
    let (facade, sink) = facade_with_sink(test_config());
    let attempts = AtomicU32::new(0);
    let options = RequestOptions::builder()
        .endpoint("sdk://openai/chat")
        .provider(ProviderKey::OpenAi)
        .build();

    let result: Result<(), _> = facade
        .call(&options, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ErrataError::Upstream(json!({
                    "statusCode": 403,
                    "message": "Country, region, or territory not supported"
                })))
            }
        })
        .await;

    let analysis = result.unwrap_err();
    assert_eq!(analysis.code, ErrorCode::OpenAiUnsupportedRegion);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn each_logical_call_gets_its_own_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not here"})))
        .mount(&server)
        .await;

    let (facade, sink) = facade_with_sink(test_config());
    let options = post(&server, "/missing");
    let (a, b) = tokio::join!(facade.call_json(&options), facade.call_json(&options));

    let (a, b) = (a.unwrap_err(), b.unwrap_err());
    assert_eq!(a.code, ErrorCode::NotFound);
    assert_ne!(a.context.request_id, b.context.request_id);

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].request_id, records[1].request_id);
}

#[tokio::test]
async fn envelope_serializes_for_ui_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "This model's maximum context length is 8192 tokens"}
        })))
        .mount(&server)
        .await;

    let (facade, _sink) = facade_with_sink(test_config());
    let envelope: CallEnvelope<serde_json::Value> =
        facade.call_json(&post(&server, "/v1/chat/completions")).await.into();
    let value = serde_json::to_value(&envelope).unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["error"]["code"], json!("TOKEN_LIMIT_EXCEEDED"));
    assert!(value.get("data").is_none());
    assert!(value["error"]["plainEnglish"]["whatItMeans"].is_string());
}

#[tokio::test]
async fn slow_down_derates_throttler_then_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"message": "Please slow down"}
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "chatcmpl-2"})))
        .mount(&server)
        .await;

    let (facade, sink) = facade_with_sink(test_config());
    facade
        .call_json(&post(&server, "/v1/chat/completions"))
        .await
        .unwrap();

    assert_eq!(sink.attempts()[0].2, ErrorCode::SlowDown);
    assert_eq!(facade.throttler().current_rate(), 31);
}

#[tokio::test(start_paused = true)]
async fn operation_is_not_invoked_before_throttle_admission() {
    let mut config = test_config();
    config.max_requests_per_second = 1;
    let (facade, sink) = facade_with_sink(config);
    facade
        .throttler()
        .enter_throttle_mode(Some(Duration::from_secs(10)));

    let invoked = AtomicU32::new(0);
    let cancel = CancellationToken::new();
    let options = RequestOptions::builder()
        .endpoint("sdk://openai/chat")
        .cancel(cancel.clone())
        .build();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let result: Result<(), _> = facade
        .call(&options, || {
            invoked.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;
    canceller.await.unwrap();

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
    assert_eq!(sink.records().len(), 1);
}
