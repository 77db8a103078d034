//! Dual-audience explanations for canonical error codes.
//!
//! `PlainEnglish` is safe to show any end user. `CellarMessage` carries the
//! deeper remediation: operational steps for engineers, impact for the
//! business, and who to escalate to. Neither ever includes raw error text.

mod catalog;

use serde::Serialize;

use crate::classify::ErrorCode;

/// Non-technical explanation of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainEnglish {
    pub what_it_means: &'static str,
    pub why_it_happens: &'static str,
    pub how_it_affects: &'static str,
}

/// Detailed remediation for errors that need more than a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellarMessage {
    pub technical: &'static [&'static str],
    pub business: &'static [&'static str],
    pub escalation: &'static str,
}

/// Plain-language explanation for `code`. Never empty.
pub fn explain(code: ErrorCode) -> PlainEnglish {
    *catalog::plain_english(code)
}

/// The generic fallback explanation used for unrecognized errors.
pub fn default_explanation() -> PlainEnglish {
    catalog::UNKNOWN
}

/// Cellar message for `code`, if the code warrants one.
///
/// Self-explanatory validation and not-found errors have none.
pub fn cellar_message(code: ErrorCode) -> Option<CellarMessage> {
    catalog::cellar(code).copied()
}

/// The action line shown alongside an explanation.
///
/// Retryable codes that used up their policy say so, with the attempt count;
/// everything else gets the code's remediation.
pub fn next_step(code: ErrorCode, attempts: u32, retries_exhausted: bool) -> String {
    if retries_exhausted {
        let noun = if attempts == 1 { "attempt" } else { "attempts" };
        format!(
            "Retries exhausted after {attempts} {noun}. {}",
            catalog::remedy(code)
        )
    } else {
        catalog::remedy(code).to_string()
    }
}
