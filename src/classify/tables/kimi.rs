//! Kimi (Moonshot AI) rules.

use crate::classify::code::{ErrorCode::*, Severity::*};
use crate::classify::rules::Rule;

pub(crate) const RULES: &[Rule] = &[
    Rule::new(KimiEngineOverloaded, High, true).types(&["engine_overloaded_error"]),
    Rule::new(KimiQuotaExceeded, Critical, false).types(&["exceeded_current_quota_error"]),
    Rule::new(KimiRateLimit, Medium, true).types(&["rate_limit_reached_error"]),
    Rule::new(KimiContentFilter, High, false).types(&["content_filter"]),
    Rule::new(KimiModelNotFound, Medium, false).statuses(&[404]).patterns(&["model"]),
    Rule::new(KimiContextLengthExceeded, Medium, false)
        .statuses(&[400])
        .patterns(&["exceeded model token limit", "context length", "token limit"]),
    Rule::new(KimiContentFilter, High, false)
        .statuses(&[400])
        .patterns(&["high risk", "content_filter"]),
    Rule::new(KimiQuotaExceeded, Critical, false)
        .statuses(&[429])
        .patterns(&["quota", "balance"]),
    Rule::new(KimiEngineOverloaded, High, true)
        .statuses(&[429])
        .patterns(&["overloaded"]),
    Rule::new(KimiRateLimit, Medium, true).statuses(&[429]),
    Rule::new(KimiModelNotFound, Medium, false).patterns(&["model not found"]),
    Rule::new(KimiRateLimit, Medium, true).patterns(&["rate limit"]),
];
