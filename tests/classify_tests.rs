//! Classification and explanation behavior across raw error shapes.

use pretty_assertions::assert_eq;
use serde_json::json;
use strum::IntoEnumIterator;

use errata::classify::{classify, classify_with_hint, Classification, ErrorCode, Severity};
use errata::error::ErrataError;
use errata::explain::{cellar_message, explain, next_step};
use errata::provider::ProviderKey;

fn code_of(raw: serde_json::Value, provider: Option<ProviderKey>) -> ErrorCode {
    classify(&raw, provider).code
}

#[test]
fn rate_limit_without_hint() {
    let raw = json!({"statusCode": 429, "message": "rate limit exceeded"});
    assert_eq!(
        classify(&raw, None),
        Classification {
            code: ErrorCode::RateLimit,
            severity: Severity::Medium,
            retryable: true,
        }
    );
}

#[test]
fn incorrect_api_key_is_critical_and_final() {
    let raw = json!({"statusCode": 401, "message": "Incorrect API key provided"});
    assert_eq!(
        classify(&raw, None),
        Classification {
            code: ErrorCode::IncorrectApiKey,
            severity: Severity::Critical,
            retryable: false,
        }
    );
}

#[test]
fn claude_529_needs_the_provider_hint() {
    let raw = json!({"statusCode": 529, "message": "Overloaded"});

    let hinted = classify_with_hint(&raw, Some("anthropic"));
    assert_eq!(hinted.code, ErrorCode::ClaudeOverloaded);
    assert!(hinted.retryable);

    assert_eq!(classify(&raw, None), Classification::UNKNOWN);
}

#[test]
fn status_400_is_disambiguated_by_message() {
    let cases = [
        ("This model's maximum context length is 8192 tokens", ErrorCode::TokenLimitExceeded),
        (
            "Your request was rejected as a result of our safety system",
            ErrorCode::ContentPolicyViolation,
        ),
        ("'messages' is a required property", ErrorCode::InvalidFormat),
    ];
    for (message, expected) in cases {
        assert_eq!(
            code_of(json!({"status": 400, "message": message}), None),
            expected,
            "{message}"
        );
    }
}

#[test]
fn explicit_status_beats_digits_in_message() {
    let raw = json!({"status": 500, "message": "upstream returned 404 for /v1/models"});
    assert_eq!(code_of(raw, None), ErrorCode::InternalServerError);
}

#[test]
fn status_is_mined_from_plain_strings() {
    let classification = classify("Request failed with status code 503", None);
    assert_eq!(classification.code, ErrorCode::EngineOverloaded);
    assert!(classification.retryable);
}

#[test]
fn network_failures_are_retryable_connection_errors() {
    for text in ["connect ECONNREFUSED 127.0.0.1:443", "TypeError: fetch failed"] {
        let classification = classify(text, None);
        assert_eq!(classification.code, ErrorCode::ConnectionError, "{text}");
        assert!(classification.retryable);
    }
}

#[test]
fn attempt_timeouts_classify_as_timeout_error() {
    let classification = classify(&ErrataError::Timeout(30_000), Some(ProviderKey::OpenAi));
    assert_eq!(classification.code, ErrorCode::TimeoutError);
    assert!(classification.retryable);
}

#[test]
fn openai_nested_error_type_wins() {
    let raw = json!({
        "error": {
            "message": "You exceeded your current quota, please check your plan and billing details.",
            "type": "insufficient_quota",
            "code": "insufficient_quota"
        }
    });
    let classification = classify_with_hint(&raw, Some("OpenAI"));
    assert_eq!(classification.code, ErrorCode::BillingHardLimit);
    assert!(!classification.retryable);
}

#[test]
fn anthropic_error_type_maps_without_status() {
    let raw = json!({
        "type": "error",
        "error": {"type": "rate_limit_error", "message": "Number of requests has exceeded your rate limit"}
    });
    assert_eq!(code_of(raw, Some(ProviderKey::Anthropic)), ErrorCode::ClaudeRateLimit);
}

#[test]
fn gemini_status_strings_map_to_gemini_codes() {
    let raw = json!({
        "error": {
            "code": 400,
            "message": "Request contains an invalid argument.",
            "status": "INVALID_ARGUMENT"
        }
    });
    assert_eq!(code_of(raw.clone(), Some(ProviderKey::Gemini)), ErrorCode::GeminiInvalidArgument);
    assert_eq!(code_of(raw, None), ErrorCode::InvalidFormat);
}

#[test]
fn gemini_block_reason_is_a_safety_block() {
    let raw = json!({"promptFeedback": {"blockReason": "SAFETY"}});
    assert_eq!(code_of(raw, Some(ProviderKey::Gemini)), ErrorCode::GeminiSafetyBlock);
}

#[test]
fn deepseek_overload_prefers_provider_table() {
    let raw = json!({"status": 503, "message": "Server overloaded, please retry shortly"});
    assert_eq!(
        code_of(raw.clone(), Some(ProviderKey::DeepSeek)),
        ErrorCode::DeepSeekServerOverloaded
    );
    assert_eq!(code_of(raw, None), ErrorCode::EngineOverloaded);
}

#[test]
fn kimi_quota_is_not_a_rate_limit() {
    let raw = json!({
        "status": 429,
        "error": {
            "type": "exceeded_current_quota_error",
            "message": "Your account is suspended, please check your plan and billing details"
        }
    });
    assert_eq!(code_of(raw, Some(ProviderKey::Kimi)), ErrorCode::KimiQuotaExceeded);
}

#[test]
fn kimi_missing_model_and_context_length() {
    let missing = json!({"status": 404, "message": "Not found the model moonshot-v9 or Permission denied"});
    let classification = classify(&missing, Some(ProviderKey::Kimi));
    assert_eq!(classification.code, ErrorCode::KimiModelNotFound);
    assert!(!classification.retryable);

    let too_long = json!({
        "status": 400,
        "message": "Invalid request: Your request exceeded model token limit: 8192"
    });
    assert_eq!(
        code_of(too_long, Some(ProviderKey::Kimi)),
        ErrorCode::KimiContextLengthExceeded
    );
}

#[test]
fn mistral_table_covers_model_capacity_and_validation() {
    let cases = [
        (json!({"status": 400, "message": "Invalid model: mistral-huge-latest"}), ErrorCode::MistralInvalidModel),
        (
            json!({"status": 429, "message": "Service tier capacity exceeded for this model."}),
            ErrorCode::MistralCapacityExceeded,
        ),
        (
            json!({"status": 422, "message": "Input should be a valid list"}),
            ErrorCode::MistralValidationError,
        ),
    ];
    for (raw, expected) in cases {
        assert_eq!(code_of(raw, Some(ProviderKey::Mistral)), expected);
    }

    let capacity = classify(
        &json!({"status": 429, "message": "Service tier capacity exceeded for this model."}),
        Some(ProviderKey::Mistral),
    );
    assert!(capacity.retryable);
    assert_eq!(
        code_of(json!({"status": 422, "message": "Input should be a valid list"}), None),
        ErrorCode::UnprocessableEntity
    );
}

#[test]
fn slow_down_is_retryable() {
    let classification = classify(&json!({"status": 503, "message": "Please slow down"}), None);
    assert_eq!(classification.code, ErrorCode::SlowDown);
    assert!(classification.retryable);
    assert!(classification.code.signals_slow_down());
}

#[test]
fn deactivated_account_is_organization_suspended() {
    let raw = json!({"status": 403, "message": "Your account has been deactivated"});
    let classification = classify(&raw, None);
    assert_eq!(classification.code, ErrorCode::OrganizationSuspended);
    assert_eq!(classification.severity, Severity::Critical);
    assert!(!classification.retryable);
}

#[test]
fn gemini_harm_category_on_400_is_a_safety_block() {
    let raw = json!({
        "status": 400,
        "message": "Content blocked: HARM_CATEGORY_DANGEROUS_CONTENT"
    });
    assert_eq!(code_of(raw, Some(ProviderKey::Gemini)), ErrorCode::GeminiSafetyBlock);
}

#[test]
fn provider_substring_fallback_runs_after_generic_status_rules() {
    // "timeout" appears in the text, but the corroborated generic 502 rule wins.
    let raw = json!({"status": 502, "message": "upstream timeout while proxying"});
    assert_eq!(code_of(raw, Some(ProviderKey::Perplexity)), ErrorCode::BadGateway);

    let bare = json!({"message": "request timed out after 30s"});
    assert_eq!(code_of(bare, Some(ProviderKey::Perplexity)), ErrorCode::PerplexityTimeout);
}

#[test]
fn unknown_hint_falls_back_to_generic_rules() {
    let raw = json!({"statusCode": 429});
    assert_eq!(classify_with_hint(&raw, Some("cohere")).code, ErrorCode::RateLimit);
}

#[test]
fn unrecognized_errors_are_unknown_and_never_retried() {
    for raw in [json!({}), json!(null), json!({"message": "something odd happened"})] {
        assert_eq!(classify(&raw, None), Classification::UNKNOWN);
    }
    assert_eq!(classify("", None), Classification::UNKNOWN);
}

#[test]
fn classification_is_deterministic() {
    let inputs = [
        (json!({"statusCode": 429, "message": "rate limit exceeded"}), None),
        (json!({"statusCode": 529, "message": "Overloaded"}), Some(ProviderKey::Anthropic)),
        (json!({"message": "fetch failed"}), Some(ProviderKey::Kimi)),
        (json!({"status": 418}), None),
    ];
    for (raw, provider) in &inputs {
        let first = classify(raw, *provider);
        for _ in 0..50 {
            assert_eq!(classify(raw, *provider), first);
        }
    }
}

#[test]
fn huge_messages_classify_the_same() {
    let padding = "lorem ipsum ".repeat(100_000);
    let raw = json!({"statusCode": 429, "message": format!("rate limit exceeded {padding}")});
    assert_eq!(code_of(raw, None), ErrorCode::RateLimit);
}

#[test]
fn every_code_has_an_explanation_and_next_step() {
    for code in ErrorCode::iter() {
        let text = explain(code);
        assert!(!text.what_it_means.is_empty(), "{code}");
        assert!(!text.why_it_happens.is_empty(), "{code}");
        assert!(!text.how_it_affects.is_empty(), "{code}");
        assert!(!next_step(code, 1, false).is_empty(), "{code}");
    }
}

#[test]
fn critical_codes_carry_escalation_guidance() {
    for code in [
        ErrorCode::IncorrectApiKey,
        ErrorCode::BillingHardLimit,
        ErrorCode::OrganizationSuspended,
        ErrorCode::ClaudeAuthentication,
    ] {
        let cellar = cellar_message(code).unwrap_or_else(|| panic!("{code} has no cellar message"));
        assert!(!cellar.escalation.is_empty());
    }
}
