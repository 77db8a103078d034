//! Shared HTTP client, auth headers, and response-to-error mapping.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Method;
use serde_json::Value;

use crate::classify::facts;
use crate::error::ErrataError;
use crate::provider::ProviderKey;

const ANTHROPIC_VERSION: &str = "2023-06-01";

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// Per-attempt deadlines are applied by the caller, so the client itself only
/// carries a generous upper bound.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            })
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Build Anthropic-style headers (x-api-key).
pub fn anthropic_headers(api_key: &str, version: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(api_key) {
        headers.insert("x-api-key", val);
    }
    if let Ok(val) = HeaderValue::from_str(version) {
        headers.insert("anthropic-version", val);
    }
    headers
}

/// Headers carrying `api_key` the way `provider` expects it.
pub fn auth_headers(provider: ProviderKey, api_key: &str) -> HeaderMap {
    match provider {
        ProviderKey::Anthropic => anthropic_headers(api_key, ANTHROPIC_VERSION),
        ProviderKey::Gemini => {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            if let Ok(val) = HeaderValue::from_str(api_key) {
                headers.insert("x-goog-api-key", val);
            }
            headers
        }
        _ => bearer_headers(api_key),
    }
}

/// Map a non-success response into an [`ErrataError::Api`].
///
/// A JSON body is kept for classification; the human message is taken from
/// the usual `error.message` / `message` / `error` locations, falling back to
/// the (truncated) body text.
pub fn status_to_error(status: u16, headers: &HeaderMap, body: &str) -> ErrataError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(extract_message)
        .unwrap_or_else(|| facts::truncate(body.trim()).to_string());
    let retry_after_ms = headers
        .get(RETRY_AFTER)
        .and_then(parse_retry_after)
        .or_else(|| parsed.as_ref().and_then(body_retry_after))
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));

    ErrataError::Api {
        status,
        message,
        body: parsed,
        retry_after_ms,
    }
}

fn extract_message(body: &Value) -> Option<String> {
    [
        body.pointer("/error/message"),
        body.get("message"),
        body.get("error"),
        body.get("detail"),
    ]
    .into_iter()
    .flatten()
    .find_map(|v| v.as_str().map(str::to_string))
}

/// `Retry-After` as delta-seconds or an HTTP date.
pub fn parse_retry_after(value: &HeaderValue) -> Option<Duration> {
    let raw = value.to_str().ok()?.trim();
    if let Ok(secs) = raw.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).ok();
    }
    let at = chrono::DateTime::parse_from_rfc2822(raw).ok()?;
    (at.with_timezone(&chrono::Utc) - chrono::Utc::now()).to_std().ok()
}

fn body_retry_after(body: &Value) -> Option<Duration> {
    body.pointer("/error/retry_after")
        .or_else(|| body.get("retry_after"))
        .and_then(Value::as_f64)
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
}

/// Send a JSON request and decode the JSON response.
///
/// Non-2xx responses become [`ErrataError::Api`]; an empty success body
/// decodes as `null`.
pub async fn send_json(
    method: Method,
    url: &str,
    headers: HeaderMap,
    body: Option<&Value>,
) -> Result<Value, ErrataError> {
    let mut request = shared_client().request(method, url).headers(headers);
    if let Some(body) = body {
        request = request.json(body);
    }

    let resp = request.send().await?;
    let status = resp.status();
    let response_headers = resp.headers().clone();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(status_to_error(status.as_u16(), &response_headers, &text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn openai_error_body_is_parsed() {
        let body = json!({
            "error": {
                "message": "Rate limit reached for gpt-4o",
                "type": "requests",
                "code": "rate_limit_exceeded"
            }
        })
        .to_string();
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));

        let err = status_to_error(429, &headers, &body);
        match &err {
            ErrataError::Api {
                status,
                message,
                body,
                ..
            } => {
                assert_eq!(*status, 429);
                assert_eq!(message, "Rate limit reached for gpt-4o");
                assert!(body.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let err = status_to_error(502, &HeaderMap::new(), "  Bad Gateway\n");
        assert_eq!(err.to_string(), "API error (status 502): Bad Gateway");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn retry_after_falls_back_to_body() {
        let body = json!({"error": {"message": "slow", "retry_after": 1.5}}).to_string();
        let err = status_to_error(429, &HeaderMap::new(), &body);
        assert_eq!(err.retry_after(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn retry_after_rejects_garbage() {
        assert_eq!(parse_retry_after(&HeaderValue::from_static("soon")), None);
        assert_eq!(parse_retry_after(&HeaderValue::from_static("-1")), None);
        assert_eq!(parse_retry_after(&HeaderValue::from_static("NaN")), None);
    }

    #[test]
    fn out_of_range_retry_after_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("1e20"));
        let err = status_to_error(429, &headers, "{}");
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.retry_after(), None);

        let body = json!({"retry_after": 1e300}).to_string();
        let err = status_to_error(429, &HeaderMap::new(), &body);
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn large_retry_after_saturates_milliseconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("1e17"));
        let err = status_to_error(503, &headers, "");
        assert_eq!(err.retry_after(), Some(Duration::from_millis(u64::MAX)));
    }

    #[test]
    fn auth_headers_follow_provider_convention() {
        let headers = auth_headers(ProviderKey::Anthropic, "sk-ant-test");
        assert_eq!(headers["x-api-key"], "sk-ant-test");
        assert_eq!(headers["anthropic-version"], ANTHROPIC_VERSION);

        let headers = auth_headers(ProviderKey::Gemini, "AIzaTest");
        assert_eq!(headers["x-goog-api-key"], "AIzaTest");

        let headers = auth_headers(ProviderKey::DeepSeek, "sk-test");
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test");
    }
}
