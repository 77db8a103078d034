//! Perplexity rules.
//!
//! Perplexity errors often arrive as bare text without a status, so this
//! table leans on message-only rules. Those only run after every
//! status-corroborated rule (provider and generic) has missed.

use crate::classify::code::{ErrorCode::*, Severity::*};
use crate::classify::rules::Rule;

pub(crate) const RULES: &[Rule] = &[
    Rule::new(PerplexityInvalidModel, Medium, false)
        .statuses(&[400])
        .patterns(&["invalid model", "model"]),
    Rule::new(PerplexityRateLimit, Medium, true).statuses(&[429]),
    Rule::new(PerplexityInvalidModel, Medium, false).patterns(&["invalid model"]),
    Rule::new(PerplexityRateLimit, Medium, true).patterns(&["rate limit", "too many requests"]),
    Rule::new(PerplexityTimeout, Medium, true).patterns(&["timed out", "timeout"]),
];
