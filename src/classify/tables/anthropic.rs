//! Anthropic (Claude) rules.
//!
//! Claude reports its own `error.type` on every failure and uses 529 for
//! overload, which the generic table does not know.

use crate::classify::code::{ErrorCode::*, Severity::*};
use crate::classify::rules::Rule;

pub(crate) const RULES: &[Rule] = &[
    Rule::new(ClaudeOverloaded, High, true).types(&["overloaded_error"]),
    Rule::new(ClaudeRateLimit, Medium, true).types(&["rate_limit_error"]),
    Rule::new(ClaudeAuthentication, Critical, false).types(&["authentication_error"]),
    Rule::new(ClaudePermission, High, false).types(&["permission_error"]),
    Rule::new(ClaudeNotFound, Medium, false).types(&["not_found_error"]),
    Rule::new(ClaudeRequestTooLarge, Medium, false).types(&["request_too_large"]),
    Rule::new(ClaudeApiError, High, true).types(&["api_error"]),
    Rule::new(ClaudeInvalidRequest, Medium, false).types(&["invalid_request_error"]),
    Rule::new(ClaudeInvalidRequest, Medium, false).statuses(&[400]),
    Rule::new(ClaudeAuthentication, Critical, false).statuses(&[401]),
    Rule::new(ClaudePermission, High, false).statuses(&[403]),
    Rule::new(ClaudeNotFound, Medium, false).statuses(&[404]),
    Rule::new(ClaudeRequestTooLarge, Medium, false).statuses(&[413]),
    Rule::new(ClaudeRateLimit, Medium, true).statuses(&[429]),
    Rule::new(ClaudeApiError, High, true).statuses(&[500]),
    Rule::new(ClaudeOverloaded, High, true).statuses(&[529]),
];
