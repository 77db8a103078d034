//! Rules that apply to every provider and to plain HTTP endpoints.

use crate::classify::code::{ErrorCode::*, Severity::*};
use crate::classify::rules::Rule;

pub(crate) const RULES: &[Rule] = &[
    // Vendor type / code fields.
    Rule::new(IncorrectApiKey, Critical, false).types(&["invalid_api_key", "incorrect_api_key"]),
    Rule::new(BillingHardLimit, Critical, false).types(&[
        "insufficient_quota",
        "billing_hard_limit_reached",
        "billing_not_active",
    ]),
    Rule::new(TokenLimitExceeded, Medium, false)
        .types(&["context_length_exceeded", "string_above_max_length"]),
    Rule::new(ContentPolicyViolation, High, false)
        .types(&["content_policy_violation", "content_filter"]),
    Rule::new(ModelNotFound, High, false).types(&["model_not_found"]),
    Rule::new(RateLimit, Medium, true).types(&["rate_limit_exceeded", "too_many_requests"]),
    Rule::new(EngineOverloaded, High, true).types(&["server_overloaded", "engine_overloaded"]),
    Rule::new(ConnectionError, Medium, true).types(&[
        "connection_error",
        "econnrefused",
        "econnreset",
        "enotfound",
        "etimedout",
        "eai_again",
        "epipe",
    ]),
    Rule::new(TimeoutError, Medium, true).types(&["timeout", "request_timeout"]),
    // Status corroborated by message content.
    Rule::new(IncorrectApiKey, Critical, false).statuses(&[401]).patterns(&[
        "incorrect api key",
        "invalid api key",
        "invalid x-api-key",
        "api key not valid",
    ]),
    Rule::new(OrganizationSuspended, Critical, false)
        .statuses(&[401, 403])
        .patterns(&["suspended", "deactivated", "account disabled"]),
    Rule::new(BillingHardLimit, Critical, false)
        .statuses(&[402, 403, 429])
        .patterns(&[
            "exceeded your current quota",
            "insufficient_quota",
            "billing hard limit",
            "billing details",
            "check your plan",
        ]),
    Rule::new(ContentPolicyViolation, High, false)
        .statuses(&[400])
        .patterns(&[
            "content policy",
            "content_policy",
            "content management policy",
            "safety system",
            "flagged",
        ]),
    Rule::new(TokenLimitExceeded, Medium, false)
        .statuses(&[400, 413])
        .patterns(&[
            "maximum context length",
            "context length",
            "context_length",
            "too many tokens",
            "token limit",
            "max_tokens",
        ]),
    Rule::new(ModelNotFound, High, false).statuses(&[404]).patterns(&["model"]),
    Rule::new(SlowDown, Medium, true)
        .statuses(&[503])
        .patterns(&["slow down", "slow_down", "reduce your request rate"]),
    // Status alone.
    Rule::new(InvalidFormat, Medium, false).statuses(&[400]),
    Rule::new(InvalidAuth, Critical, false).statuses(&[401]),
    Rule::new(PaymentRequired, Critical, false).statuses(&[402]),
    Rule::new(PermissionDenied, High, false).statuses(&[403]),
    Rule::new(NotFound, Medium, false).statuses(&[404]),
    Rule::new(TimeoutError, Medium, true).statuses(&[408]),
    Rule::new(ResourceGone, Medium, false).statuses(&[410]),
    Rule::new(UnsupportedMediaType, Medium, false).statuses(&[415]),
    Rule::new(UnprocessableEntity, Medium, false).statuses(&[422]),
    Rule::new(RateLimit, Medium, true).statuses(&[429]),
    Rule::new(InternalServerError, High, true).statuses(&[500]),
    Rule::new(BadGateway, Medium, true).statuses(&[502]),
    Rule::new(EngineOverloaded, High, true).statuses(&[503]),
    Rule::new(GatewayTimeout, Medium, true).statuses(&[504]),
    // Message text alone.
    Rule::new(ConnectionError, Medium, true).patterns(&[
        "econnrefused",
        "etimedout",
        "econnreset",
        "enotfound",
        "fetch failed",
        "network",
        "connection refused",
        "connection reset",
        "dns error",
        "error sending request",
    ]),
    Rule::new(TimeoutError, Medium, true).patterns(&["timed out", "timeout", "deadline exceeded"]),
];
