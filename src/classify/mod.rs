//! Error classification: raw provider errors to canonical codes.
//!
//! Classification is a pure function over [`ErrorFacts`]. A provider hint
//! selects that provider's table, which overrides the generic table wherever
//! both could match. Evaluation order:
//!
//! 1. provider table, vendor-type / status+message / status tiers
//! 2. generic table, same tiers
//! 3. provider table, message-only tier
//! 4. generic table, message-only tier
//!
//! Nothing matching yields [`ErrorCode::Unknown`], which is never retried.

pub mod code;
pub mod facts;
pub mod rules;
pub mod tables;

pub use code::{ErrorCode, RetryFamily, Severity};
pub use facts::{ErrorFacts, RawError, StatusSource};

use serde::Serialize;

use crate::provider::ProviderKey;
use rules::{Table, Tier};

/// Outcome of classifying one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub code: ErrorCode,
    pub severity: Severity,
    pub retryable: bool,
}

impl Classification {
    /// Fallback for anything no rule recognizes.
    pub const UNKNOWN: Classification = Classification {
        code: ErrorCode::Unknown,
        severity: Severity::High,
        retryable: false,
    };

    /// Produced when the caller aborts; never comes out of a rule table.
    pub const CANCELLED: Classification = Classification {
        code: ErrorCode::Cancelled,
        severity: Severity::Low,
        retryable: false,
    };
}

/// Classify any supported raw error.
pub fn classify<R: RawError + ?Sized>(raw: &R, provider: Option<ProviderKey>) -> Classification {
    classify_facts(&raw.facts(), provider)
}

/// Classify with a free-form provider hint such as `"claude"` or `"OpenAI"`.
///
/// Unrecognized hints fall back to the generic table.
pub fn classify_with_hint<R: RawError + ?Sized>(raw: &R, hint: Option<&str>) -> Classification {
    classify(raw, hint.and_then(ProviderKey::parse))
}

/// Classify already-extracted facts.
pub fn classify_facts(facts: &ErrorFacts, provider: Option<ProviderKey>) -> Classification {
    let specialized = provider.and_then(tables::for_provider);
    let generic = &tables::GENERIC;

    let corroborated = specialized
        .into_iter()
        .chain(Some(generic))
        .find_map(|table| first_match(table, &Tier::CORROBORATED, facts));

    let classification = corroborated
        .or_else(|| {
            specialized
                .into_iter()
                .chain(Some(generic))
                .find_map(|table| first_match(table, &[Tier::Message], facts))
        })
        .unwrap_or(Classification::UNKNOWN);

    tracing::debug!(
        code = %classification.code,
        status = ?facts.status,
        provider = ?provider,
        "classified error"
    );
    classification
}

fn first_match(table: &Table, tiers: &[Tier], facts: &ErrorFacts) -> Option<Classification> {
    tiers.iter().find_map(|tier| {
        table.find(*tier, facts).map(|rule| Classification {
            code: rule.code,
            severity: rule.severity,
            retryable: rule.retryable,
        })
    })
}
