//! Canonical error codes and severities.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Machine-readable, provider-independent error code.
///
/// Every classifiable code lives in exactly one rule table. `Unknown` is the
/// classifier's fallback and `Cancelled` is produced only by the recovery
/// facade when the caller aborts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Generic HTTP and transport failures.
    InvalidFormat,
    ContentPolicyViolation,
    TokenLimitExceeded,
    InvalidAuth,
    IncorrectApiKey,
    PaymentRequired,
    BillingHardLimit,
    PermissionDenied,
    OrganizationSuspended,
    ModelNotFound,
    NotFound,
    ResourceGone,
    UnsupportedMediaType,
    UnprocessableEntity,
    RateLimit,
    InternalServerError,
    BadGateway,
    SlowDown,
    EngineOverloaded,
    GatewayTimeout,
    TimeoutError,
    ConnectionError,

    // OpenAI.
    #[serde(rename = "OPENAI_UNSUPPORTED_REGION")]
    #[strum(serialize = "OPENAI_UNSUPPORTED_REGION")]
    OpenAiUnsupportedRegion,
    #[serde(rename = "OPENAI_ORGANIZATION_REQUIRED")]
    #[strum(serialize = "OPENAI_ORGANIZATION_REQUIRED")]
    OpenAiOrganizationRequired,
    #[serde(rename = "OPENAI_INVALID_ORGANIZATION")]
    #[strum(serialize = "OPENAI_INVALID_ORGANIZATION")]
    OpenAiInvalidOrganization,

    // Anthropic.
    ClaudeOverloaded,
    ClaudeInvalidRequest,
    ClaudeAuthentication,
    ClaudePermission,
    ClaudeNotFound,
    ClaudeRequestTooLarge,
    ClaudeRateLimit,
    ClaudeApiError,

    // Gemini.
    GeminiSafetyBlock,
    GeminiInvalidArgument,
    GeminiFailedPrecondition,
    GeminiPermissionDenied,
    GeminiResourceExhausted,
    GeminiInternal,
    GeminiUnavailable,
    GeminiDeadlineExceeded,

    // Mistral.
    MistralInvalidModel,
    MistralCapacityExceeded,
    MistralValidationError,

    // DeepSeek.
    #[serde(rename = "DEEPSEEK_INSUFFICIENT_BALANCE")]
    #[strum(serialize = "DEEPSEEK_INSUFFICIENT_BALANCE")]
    DeepSeekInsufficientBalance,
    #[serde(rename = "DEEPSEEK_INVALID_PARAMETERS")]
    #[strum(serialize = "DEEPSEEK_INVALID_PARAMETERS")]
    DeepSeekInvalidParameters,
    #[serde(rename = "DEEPSEEK_SERVER_OVERLOADED")]
    #[strum(serialize = "DEEPSEEK_SERVER_OVERLOADED")]
    DeepSeekServerOverloaded,

    // Perplexity.
    PerplexityInvalidModel,
    PerplexityRateLimit,
    PerplexityTimeout,

    // Kimi (Moonshot).
    KimiModelNotFound,
    KimiContextLengthExceeded,
    KimiEngineOverloaded,
    KimiQuotaExceeded,
    KimiContentFilter,
    KimiRateLimit,

    Cancelled,
    Unknown,
}

impl ErrorCode {
    /// Canonical string form, e.g. `"RATE_LIMIT"`.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Failure family used to pick a retry policy.
    ///
    /// Returns `None` for codes that are never retried.
    pub fn family(self) -> Option<RetryFamily> {
        use ErrorCode::*;
        match self {
            RateLimit | ClaudeRateLimit | GeminiResourceExhausted | PerplexityRateLimit
            | KimiRateLimit | MistralCapacityExceeded => Some(RetryFamily::RateLimit),
            InternalServerError | BadGateway | SlowDown | EngineOverloaded | GatewayTimeout
            | ClaudeOverloaded | ClaudeApiError | GeminiInternal | GeminiUnavailable
            | GeminiDeadlineExceeded | DeepSeekServerOverloaded | KimiEngineOverloaded => {
                Some(RetryFamily::ServerError)
            }
            TimeoutError | ConnectionError | PerplexityTimeout => Some(RetryFamily::Connection),
            _ => None,
        }
    }

    /// Whether this code means the provider asked us to reduce request rate,
    /// as opposed to a one-off quota rejection.
    pub fn signals_slow_down(self) -> bool {
        matches!(
            self,
            ErrorCode::SlowDown
                | ErrorCode::EngineOverloaded
                | ErrorCode::ClaudeOverloaded
                | ErrorCode::GeminiUnavailable
                | ErrorCode::DeepSeekServerOverloaded
                | ErrorCode::KimiEngineOverloaded
                | ErrorCode::MistralCapacityExceeded
        )
    }
}

/// How bad an error is. Informs UI styling only, never retry logic.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Groups retryable codes that share a backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RetryFamily {
    RateLimit,
    ServerError,
    Connection,
}
