//! Google Gemini rules, keyed mostly on the canonical gRPC status string
//! Google echoes in `error.status`.

use crate::classify::code::{ErrorCode::*, Severity::*};
use crate::classify::rules::Rule;

pub(crate) const RULES: &[Rule] = &[
    Rule::new(GeminiSafetyBlock, High, false).types(&["safety", "prohibited_content", "blocklist", "spii"]),
    Rule::new(GeminiInvalidArgument, Medium, false).types(&["invalid_argument"]),
    Rule::new(GeminiFailedPrecondition, High, false).types(&["failed_precondition"]),
    Rule::new(GeminiPermissionDenied, High, false).types(&["permission_denied"]),
    Rule::new(GeminiResourceExhausted, Medium, true).types(&["resource_exhausted"]),
    Rule::new(GeminiInternal, High, true).types(&["internal"]),
    Rule::new(GeminiUnavailable, High, true).types(&["unavailable"]),
    Rule::new(GeminiDeadlineExceeded, Medium, true).types(&["deadline_exceeded"]),
    Rule::new(GeminiSafetyBlock, High, false)
        .statuses(&[400])
        .patterns(&["safety", "harm_category", "blocked"]),
    Rule::new(GeminiFailedPrecondition, High, false)
        .statuses(&[400])
        .patterns(&["user location is not supported", "billing"]),
    Rule::new(GeminiInvalidArgument, Medium, false).statuses(&[400]),
    Rule::new(GeminiPermissionDenied, High, false).statuses(&[403]),
    Rule::new(GeminiResourceExhausted, Medium, true).statuses(&[429]),
    Rule::new(GeminiInternal, High, true).statuses(&[500]),
    Rule::new(GeminiUnavailable, High, true).statuses(&[503]),
    Rule::new(GeminiDeadlineExceeded, Medium, true).statuses(&[504]),
    // Blocked prompts come back as 200 with a block reason in the body.
    Rule::new(GeminiSafetyBlock, High, false).patterns(&[
        "blockreason",
        "block_reason",
        "finishreason\":\"safety",
        "harm_category",
    ]),
];
