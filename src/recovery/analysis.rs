//! The structured, display-safe result of a failed call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::classify::{self, Classification, ErrorCode, RawError, Severity};
use crate::explain::{self, CellarMessage, PlainEnglish};
use crate::provider::ProviderKey;
use crate::util::redact::redact;

/// Where and when a call failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorContext {
    pub endpoint: String,
    pub method: String,
    pub timestamp: DateTime<Utc>,
    /// Zero-based index of the attempt that produced the final result.
    pub retry_count: u32,
    /// Shared by every attempt of one logical call.
    pub request_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKey>,
}

impl ApiErrorContext {
    /// Context for a fresh logical call, stamped now with a new request id.
    pub fn new(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            timestamp: Utc::now(),
            retry_count: 0,
            request_id: Uuid::new_v4(),
            provider: None,
        }
    }

    pub fn with_provider(mut self, provider: Option<ProviderKey>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

/// Everything a caller needs to report a failure.
///
/// Only `raw_error_redacted` is derived from the raw error, and only after
/// credential masking. The explanation fields come from static text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAnalysis {
    pub raw_error_redacted: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub retryable: bool,
    pub plain_english: PlainEnglish,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cellar_message: Option<CellarMessage>,
    pub next_step: String,
    pub context: ApiErrorContext,
}

impl ErrorAnalysis {
    /// Classify and explain `raw` as a single-attempt failure.
    pub fn analyze<R: RawError + ?Sized>(raw: &R, context: ApiErrorContext) -> Self {
        let classification = classify::classify(raw, context.provider);
        Self::from_classification(&raw.raw_text(), classification, context, false)
    }

    /// Assemble an analysis from an existing classification.
    ///
    /// `retries_exhausted` marks a retryable failure that used up its policy;
    /// the attempt count is taken from `context.retry_count`.
    pub fn from_classification(
        raw_text: &str,
        classification: Classification,
        context: ApiErrorContext,
        retries_exhausted: bool,
    ) -> Self {
        let code = classification.code;
        let attempts = context.retry_count + 1;
        Self {
            raw_error_redacted: redact(raw_text).into_owned(),
            code,
            severity: classification.severity,
            retryable: classification.retryable,
            plain_english: explain::explain(code),
            cellar_message: explain::cellar_message(code),
            next_step: explain::next_step(code, attempts, retries_exhausted),
            context,
        }
    }

    /// The caller aborted before a result arrived.
    pub fn cancelled(context: ApiErrorContext) -> Self {
        Self::from_classification(
            "request cancelled by caller",
            Classification::CANCELLED,
            context,
            false,
        )
    }

    /// The one line that is safe to show an end user.
    pub fn user_message(&self) -> String {
        format!("{} {}", self.plain_english.what_it_means, self.next_step)
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::Cancelled
    }
}

impl std::fmt::Display for ErrorAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.user_message())
    }
}

impl std::error::Error for ErrorAnalysis {}
