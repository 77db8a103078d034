use crate::classify::ErrorCode;

use super::{CellarMessage, PlainEnglish};

/// Builds a `&'static PlainEnglish` from three literals.
macro_rules! plain {
    ($what:expr, $why:expr, $how:expr $(,)?) => {
        &PlainEnglish {
            what_it_means: $what,
            why_it_happens: $why,
            how_it_affects: $how,
        }
    };
}

pub(super) const UNKNOWN: PlainEnglish = PlainEnglish {
    what_it_means: "Something unexpected went wrong while talking to the AI service.",
    why_it_happens: "The service returned an error we do not recognize yet.",
    how_it_affects: "This request did not complete. Trying again will not help until the cause is understood.",
};

pub(super) fn plain_english(code: ErrorCode) -> &'static PlainEnglish {
    use ErrorCode::*;
    match code {
        InvalidFormat => plain!(
            "The request sent to the AI service was not in a shape it accepts.",
            "A field is missing, malformed, or has a value the service rejects.",
            "This request cannot succeed as written. Nothing was generated.",
        ),
        ContentPolicyViolation => plain!(
            "The AI service refused this request because of its content rules.",
            "The prompt or attachments were flagged by the provider's safety filters.",
            "No answer was produced. Rephrasing the request usually resolves it.",
        ),
        TokenLimitExceeded => plain!(
            "The request is too long for the selected model.",
            "The conversation, documents, or requested answer length exceed the model's context window.",
            "The model could not read the whole request, so it produced nothing.",
        ),
        InvalidAuth => plain!(
            "The AI service did not accept our credentials.",
            "The API key is missing, expired, or was revoked.",
            "Every request to this provider will fail until the credentials are fixed.",
        ),
        IncorrectApiKey => plain!(
            "The API key configured for this provider is not valid.",
            "The key was mistyped, rotated, or belongs to a different account.",
            "Every request to this provider will fail until a valid key is configured.",
        ),
        PaymentRequired => plain!(
            "The AI service requires payment before it will process requests.",
            "The account has no active payment method or has an unpaid balance.",
            "Requests to this provider are blocked until billing is resolved.",
        ),
        BillingHardLimit => plain!(
            "The account has used up its spending allowance with this provider.",
            "A billing hard limit or prepaid quota has been reached.",
            "Requests are rejected until the limit is raised or the next billing period starts.",
        ),
        PermissionDenied => plain!(
            "Our account is not allowed to use this feature or model.",
            "The key lacks access to the requested model, project, or endpoint.",
            "This request cannot succeed with the current account permissions.",
        ),
        OrganizationSuspended => plain!(
            "The provider has suspended the account used for this request.",
            "The organization was deactivated, usually for billing or policy reasons.",
            "All requests to this provider will fail until the account is reinstated.",
        ),
        ModelNotFound => plain!(
            "The requested AI model does not exist or is not available to us.",
            "The model name is wrong, retired, or not enabled for this account.",
            "Requests naming this model will fail until a different model is selected.",
        ),
        NotFound => plain!(
            "The AI service could not find what we asked for.",
            "The endpoint or resource identifier does not exist.",
            "This request cannot succeed as addressed.",
        ),
        ResourceGone => plain!(
            "The requested resource has been permanently removed.",
            "The provider retired the endpoint, file, or model version.",
            "Requests to this resource will keep failing; it will not come back.",
        ),
        UnsupportedMediaType => plain!(
            "The AI service does not accept the type of content we sent.",
            "The file or payload format is not supported by this endpoint.",
            "The request was rejected before any processing happened.",
        ),
        UnprocessableEntity => plain!(
            "The AI service understood the request but could not act on it.",
            "One or more parameters are valid JSON but semantically invalid.",
            "This request cannot succeed until its parameters are corrected.",
        ),
        RateLimit => plain!(
            "We are sending requests to the AI service faster than it allows.",
            "The provider limits how many requests or tokens can be used per minute.",
            "Responses are delayed while we wait and retry automatically.",
        ),
        InternalServerError => plain!(
            "The AI service had an internal problem.",
            "Something failed on the provider's side, not in our request.",
            "The request was retried automatically; it may take a little longer.",
        ),
        BadGateway => plain!(
            "A network component in front of the AI service returned a bad response.",
            "A proxy or load balancer could not reach the provider's servers.",
            "The request was retried automatically; it may take a little longer.",
        ),
        SlowDown => plain!(
            "The AI service asked us to reduce how fast we send requests.",
            "Our recent traffic pattern triggered the provider's protective throttling.",
            "Requests to this provider are slowed down for a while to recover.",
        ),
        EngineOverloaded => plain!(
            "The AI service is temporarily overloaded.",
            "The provider is receiving more traffic than it can handle right now.",
            "Responses are delayed while we retry with increasing pauses.",
        ),
        GatewayTimeout => plain!(
            "The AI service took too long to answer.",
            "A gateway in front of the provider gave up waiting for a response.",
            "The request was retried automatically; it may take a little longer.",
        ),
        TimeoutError => plain!(
            "The request to the AI service timed out.",
            "The network or the provider was too slow to respond in time.",
            "The request was retried automatically; long prompts may need more time.",
        ),
        ConnectionError => plain!(
            "We could not connect to the AI service.",
            "The network is down, a firewall blocked the connection, or the service is unreachable.",
            "The request was retried automatically; nothing was sent to the provider.",
        ),
        OpenAiUnsupportedRegion => plain!(
            "OpenAI does not serve requests from this location.",
            "The request came from a country, region, or territory OpenAI does not support.",
            "OpenAI requests will fail from this location. Another provider can be used instead.",
        ),
        OpenAiOrganizationRequired => plain!(
            "OpenAI requires this key to belong to an organization.",
            "The API key is not attached to any OpenAI organization.",
            "OpenAI requests will fail until the key is added to an organization.",
        ),
        OpenAiInvalidOrganization => plain!(
            "The OpenAI organization we specified is not valid for this key.",
            "The organization identifier is wrong or the key is not a member of it.",
            "OpenAI requests will fail until the organization setting is corrected.",
        ),
        ClaudeOverloaded => plain!(
            "Claude is temporarily overloaded.",
            "Anthropic is receiving more traffic than it can serve right now.",
            "Responses from Claude are delayed while we retry with increasing pauses.",
        ),
        ClaudeInvalidRequest => plain!(
            "Claude rejected the request as invalid.",
            "A parameter, message ordering, or content block does not meet Anthropic's rules.",
            "This request cannot succeed as written.",
        ),
        ClaudeAuthentication => plain!(
            "Anthropic did not accept our API key.",
            "The key is missing, invalid, or was revoked.",
            "Every Claude request will fail until the key is fixed.",
        ),
        ClaudePermission => plain!(
            "Our Anthropic key is not allowed to do this.",
            "The key lacks permission for the requested model or feature.",
            "This Claude request cannot succeed with the current permissions.",
        ),
        ClaudeNotFound => plain!(
            "Anthropic could not find the requested resource.",
            "The model name or endpoint does not exist.",
            "This Claude request cannot succeed as addressed.",
        ),
        ClaudeRequestTooLarge => plain!(
            "The request is too large for Claude to accept.",
            "The payload exceeds Anthropic's maximum request size.",
            "Nothing was processed. The input needs to be made smaller.",
        ),
        ClaudeRateLimit => plain!(
            "We are sending requests to Claude faster than our account allows.",
            "Anthropic enforces per-minute request and token limits.",
            "Claude responses are delayed while we wait and retry automatically.",
        ),
        ClaudeApiError => plain!(
            "Claude had an internal problem.",
            "Something failed on Anthropic's side, not in our request.",
            "The request was retried automatically; it may take a little longer.",
        ),
        GeminiSafetyBlock => plain!(
            "Gemini blocked this request or its answer for safety reasons.",
            "Google's safety filters flagged the prompt or the generated content.",
            "No answer was returned. Rephrasing the request usually resolves it.",
        ),
        GeminiInvalidArgument => plain!(
            "Gemini rejected a value in the request.",
            "A parameter is malformed or outside the range Gemini accepts.",
            "This request cannot succeed as written.",
        ),
        GeminiFailedPrecondition => plain!(
            "Gemini cannot serve this request with the current account setup.",
            "Billing is not enabled, or the service is unavailable in this location.",
            "Gemini requests will fail until the account setup is completed.",
        ),
        GeminiPermissionDenied => plain!(
            "Our Google key is not allowed to use Gemini this way.",
            "The key lacks access to the model or the API is not enabled for the project.",
            "This Gemini request cannot succeed with the current permissions.",
        ),
        GeminiResourceExhausted => plain!(
            "We have hit Gemini's usage limits for now.",
            "The project exceeded its per-minute request or token quota.",
            "Gemini responses are delayed while we wait and retry automatically.",
        ),
        GeminiInternal => plain!(
            "Gemini had an internal problem.",
            "Something failed on Google's side, not in our request.",
            "The request was retried automatically; it may take a little longer.",
        ),
        GeminiUnavailable => plain!(
            "Gemini is temporarily unavailable.",
            "Google's service is overloaded or briefly down.",
            "Requests to Gemini are slowed down and retried automatically.",
        ),
        GeminiDeadlineExceeded => plain!(
            "Gemini took too long to finish the request.",
            "The request was too large or the service was slow to respond.",
            "The request was retried automatically; shorter prompts may help.",
        ),
        MistralInvalidModel => plain!(
            "The requested Mistral model is not available.",
            "The model name is wrong or not enabled for this account.",
            "Requests naming this model will fail until a different model is selected.",
        ),
        MistralCapacityExceeded => plain!(
            "Mistral does not have capacity for our requests right now.",
            "The account's service tier capacity is fully used.",
            "Requests to Mistral are slowed down and retried automatically.",
        ),
        MistralValidationError => plain!(
            "Mistral rejected a parameter in the request.",
            "A field failed Mistral's request validation.",
            "This request cannot succeed as written.",
        ),
        DeepSeekInsufficientBalance => plain!(
            "The DeepSeek account has run out of credit.",
            "The prepaid balance is used up.",
            "DeepSeek requests will fail until the account is topped up.",
        ),
        DeepSeekInvalidParameters => plain!(
            "DeepSeek rejected a parameter in the request.",
            "A field has a value DeepSeek does not accept.",
            "This request cannot succeed as written.",
        ),
        DeepSeekServerOverloaded => plain!(
            "DeepSeek is temporarily overloaded.",
            "DeepSeek is receiving more traffic than it can handle.",
            "Requests to DeepSeek are slowed down and retried automatically.",
        ),
        PerplexityInvalidModel => plain!(
            "The requested Perplexity model is not available.",
            "The model name is wrong or has been retired.",
            "Requests naming this model will fail until a different model is selected.",
        ),
        PerplexityRateLimit => plain!(
            "We are sending requests to Perplexity faster than it allows.",
            "Perplexity limits requests per minute for each account tier.",
            "Responses are delayed while we wait and retry automatically.",
        ),
        PerplexityTimeout => plain!(
            "Perplexity took too long to answer.",
            "Search-backed answers can be slow when the service is busy.",
            "The request was retried automatically; it may take a little longer.",
        ),
        KimiModelNotFound => plain!(
            "The requested Kimi model is not available.",
            "The model name is wrong or not offered in this region.",
            "Requests naming this model will fail until a different model is selected.",
        ),
        KimiContextLengthExceeded => plain!(
            "The request is too long for the selected Kimi model.",
            "The input and requested answer length exceed the model's token limit.",
            "Nothing was generated. A larger-context model or shorter input is needed.",
        ),
        KimiEngineOverloaded => plain!(
            "Kimi is temporarily overloaded.",
            "Moonshot's inference capacity is fully used right now.",
            "Requests to Kimi are slowed down and retried automatically.",
        ),
        KimiQuotaExceeded => plain!(
            "The Kimi account has used up its quota.",
            "The account balance or monthly quota is exhausted.",
            "Kimi requests will fail until the quota is restored.",
        ),
        KimiContentFilter => plain!(
            "Kimi refused this request because of its content rules.",
            "Moonshot's filters flagged the input as high risk.",
            "No answer was produced. Rephrasing the request usually resolves it.",
        ),
        KimiRateLimit => plain!(
            "We are sending requests to Kimi faster than it allows.",
            "Moonshot limits concurrent requests and tokens per minute.",
            "Responses are delayed while we wait and retry automatically.",
        ),
        Cancelled => plain!(
            "The request was cancelled before it finished.",
            "It was stopped on purpose or its overall deadline ran out.",
            "No answer was produced for this request.",
        ),
        Unknown => &UNKNOWN,
    }
}

/// Short remediation shown as the next step for non-exhausted failures.
pub(super) fn remedy(code: ErrorCode) -> &'static str {
    use ErrorCode::*;
    match code {
        InvalidFormat | UnprocessableEntity | GeminiInvalidArgument | MistralValidationError
        | DeepSeekInvalidParameters | ClaudeInvalidRequest => {
            "Review the request parameters and send a corrected request."
        }
        ContentPolicyViolation | GeminiSafetyBlock | KimiContentFilter => {
            "Rephrase the request to avoid content the provider flags."
        }
        TokenLimitExceeded | KimiContextLengthExceeded | ClaudeRequestTooLarge => {
            "Shorten the input or choose a model with a larger context window."
        }
        InvalidAuth | IncorrectApiKey | ClaudeAuthentication => {
            "Check the API key configured for this provider."
        }
        PaymentRequired | BillingHardLimit | DeepSeekInsufficientBalance | KimiQuotaExceeded => {
            "Ask an account administrator to review billing with the provider."
        }
        PermissionDenied | ClaudePermission | GeminiPermissionDenied => {
            "Ask an account administrator to grant access to this model or feature."
        }
        OrganizationSuspended => "Contact the provider's support to reinstate the account.",
        ModelNotFound | MistralInvalidModel | PerplexityInvalidModel | KimiModelNotFound => {
            "Select a different model."
        }
        NotFound | ClaudeNotFound => "Check the endpoint and resource identifiers.",
        ResourceGone => "Switch to the provider's replacement resource.",
        UnsupportedMediaType => "Convert the content to a format the provider supports.",
        OpenAiUnsupportedRegion => "Use a different provider from this location.",
        OpenAiOrganizationRequired | OpenAiInvalidOrganization => {
            "Check the OpenAI organization settings for this key."
        }
        GeminiFailedPrecondition => "Enable billing for the Google Cloud project or use another provider.",
        RateLimit | ClaudeRateLimit | GeminiResourceExhausted | PerplexityRateLimit
        | KimiRateLimit => "Wait a moment and try again.",
        InternalServerError | BadGateway | GatewayTimeout | ClaudeApiError | GeminiInternal
        | GeminiDeadlineExceeded => "Try again shortly.",
        SlowDown | EngineOverloaded | ClaudeOverloaded | GeminiUnavailable
        | MistralCapacityExceeded | DeepSeekServerOverloaded | KimiEngineOverloaded => {
            "Try again in a few minutes or switch to another provider."
        }
        TimeoutError | PerplexityTimeout => "Try again, or shorten the request if it keeps timing out.",
        ConnectionError => "Check the network connection and try again.",
        Cancelled => "Start the request again if it is still needed.",
        Unknown => "Contact support with the request ID.",
    }
}

const AUTH: CellarMessage = CellarMessage {
    technical: &[
        "Verify the API key in the secret store matches the provider dashboard.",
        "Confirm the key has not been rotated or revoked and is sent in the correct header.",
        "Check for stray whitespace or quoting in the configured value.",
    ],
    business: &[
        "All features backed by this provider are unavailable until credentials are fixed.",
        "No usage is being billed while requests are rejected.",
    ],
    escalation: "Escalate to the platform owner responsible for provider credentials.",
};

const BILLING: CellarMessage = CellarMessage {
    technical: &[
        "Check the provider's billing dashboard for hard limits and outstanding balance.",
        "Review recent usage for unexpected spikes before raising limits.",
    ],
    business: &[
        "Features backed by this provider stop working until spending limits are raised.",
        "Raising the limit increases the maximum monthly cost.",
    ],
    escalation: "Escalate to the budget owner for this provider account.",
};

const SUSPENDED: CellarMessage = CellarMessage {
    technical: &[
        "Check the provider's organization settings and any compliance emails.",
        "Fail over to another configured provider if one is available.",
    ],
    business: &[
        "This provider is unavailable for every user until the account is reinstated.",
        "Reinstatement timelines are set by the provider and can take days.",
    ],
    escalation: "Escalate to the account owner and the provider's support team immediately.",
};

const CAPACITY: CellarMessage = CellarMessage {
    technical: &[
        "Requests are retried with exponential backoff and the request rate is reduced.",
        "Check the provider's status page for an ongoing incident.",
        "Consider routing traffic to another provider while capacity is constrained.",
    ],
    business: &[
        "Responses are slower than usual; some may fail if the overload persists.",
    ],
    escalation: "Escalate to on-call only if failures persist beyond the provider's incident window.",
};

const RATE: CellarMessage = CellarMessage {
    technical: &[
        "Requests are retried with exponential backoff.",
        "Review the account's rate-limit tier and the concurrency of callers sharing the key.",
    ],
    business: &[
        "Users see slower responses during traffic peaks.",
        "A higher rate-limit tier may carry additional cost.",
    ],
    escalation: "Escalate to the platform owner if rate limiting becomes sustained.",
};

const UPSTREAM: CellarMessage = CellarMessage {
    technical: &[
        "The failure is on the provider's side; requests are retried automatically.",
        "Check the provider's status page and correlate with the request ID.",
    ],
    business: &["Some responses may be delayed or fail during the provider incident."],
    escalation: "Escalate to on-call if the provider reports no incident and errors continue.",
};

const NETWORK: CellarMessage = CellarMessage {
    technical: &[
        "Check DNS resolution, proxy settings, and outbound firewall rules for the provider host.",
        "Compare the per-attempt timeout with the provider's typical latency for this request size.",
    ],
    business: &["Requests fail or are slow while connectivity to the provider is degraded."],
    escalation: "Escalate to infrastructure on-call if connectivity does not recover.",
};

const CONTENT: CellarMessage = CellarMessage {
    technical: &[
        "Inspect the prompt for content the provider's moderation flags.",
        "Do not retry the same input; it will be rejected again.",
    ],
    business: &[
        "The user did not receive an answer for this request.",
        "Repeated violations can put the provider account at risk.",
    ],
    escalation: "Escalate to trust and safety if violations are frequent.",
};

const CONTEXT: CellarMessage = CellarMessage {
    technical: &[
        "Count tokens before sending and trim conversation history or attachments.",
        "Lower the requested maximum output tokens or select a larger-context model.",
    ],
    business: &["Long conversations or large documents cannot be processed in one request."],
    escalation: "No escalation needed unless limits block a core workflow.",
};

const ACCESS: CellarMessage = CellarMessage {
    technical: &[
        "Confirm the model or feature is enabled for the account and project.",
        "Check the provider's regional availability for the calling location.",
    ],
    business: &["The affected feature is unavailable until access is granted."],
    escalation: "Escalate to the account owner to request access from the provider.",
};

const UNKNOWN_CELLAR: CellarMessage = CellarMessage {
    technical: &[
        "Inspect the redacted raw error and the request ID in the development logs.",
        "Add a classification rule once the failure mode is understood.",
    ],
    business: &["The request failed for a reason that is not yet categorized."],
    escalation: "Escalate to the engineering team owning the provider integration.",
};

pub(super) fn cellar(code: ErrorCode) -> Option<&'static CellarMessage> {
    use ErrorCode::*;
    let message = match code {
        InvalidAuth | IncorrectApiKey | ClaudeAuthentication | OpenAiOrganizationRequired
        | OpenAiInvalidOrganization => &AUTH,
        PaymentRequired | BillingHardLimit | DeepSeekInsufficientBalance | KimiQuotaExceeded
        | GeminiFailedPrecondition => &BILLING,
        OrganizationSuspended => &SUSPENDED,
        SlowDown | EngineOverloaded | ClaudeOverloaded | GeminiUnavailable
        | MistralCapacityExceeded | DeepSeekServerOverloaded | KimiEngineOverloaded => &CAPACITY,
        RateLimit | ClaudeRateLimit | GeminiResourceExhausted | PerplexityRateLimit
        | KimiRateLimit => &RATE,
        InternalServerError | BadGateway | GatewayTimeout | ClaudeApiError | GeminiInternal
        | GeminiDeadlineExceeded => &UPSTREAM,
        TimeoutError | ConnectionError | PerplexityTimeout => &NETWORK,
        ContentPolicyViolation | GeminiSafetyBlock | KimiContentFilter => &CONTENT,
        TokenLimitExceeded | KimiContextLengthExceeded | ClaudeRequestTooLarge => &CONTEXT,
        PermissionDenied | ClaudePermission | GeminiPermissionDenied | OpenAiUnsupportedRegion => {
            &ACCESS
        }
        Unknown => &UNKNOWN_CELLAR,
        InvalidFormat | UnprocessableEntity | GeminiInvalidArgument | MistralValidationError
        | DeepSeekInvalidParameters | ClaudeInvalidRequest | ModelNotFound | NotFound
        | ResourceGone | UnsupportedMediaType | MistralInvalidModel | PerplexityInvalidModel
        | KimiModelNotFound | ClaudeNotFound | Cancelled => return None,
    };
    Some(message)
}
