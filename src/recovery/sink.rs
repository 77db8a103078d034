//! Log sinks for call outcomes.
//!
//! A sink sees exactly one [`CallEvent`] per logical call, plus an
//! [`AttemptEvent`] for every failure that is about to be retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::classify::{ErrorCode, Severity};
use crate::provider::ProviderKey;

use super::analysis::ErrorAnalysis;

/// Logging verbosity for call outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogTier {
    /// Redacted raw error, technical remediation, full context.
    #[strum(to_string = "development", serialize = "dev")]
    Development,
    /// Code, severity, ids, and the user-safe message only.
    #[default]
    #[strum(to_string = "production", serialize = "prod")]
    Production,
}

impl LogTier {
    pub fn sink(self) -> std::sync::Arc<dyn LogSink> {
        match self {
            LogTier::Development => std::sync::Arc::new(DevelopmentSink),
            LogTier::Production => std::sync::Arc::new(ProductionSink),
        }
    }
}

/// How a logical call ended.
#[derive(Debug, Clone, Copy)]
pub enum CallOutcome<'a> {
    Success,
    Failure(&'a ErrorAnalysis),
}

/// Terminal record for one logical call.
#[derive(Debug, Clone, Copy)]
pub struct CallEvent<'a> {
    pub request_id: Uuid,
    pub endpoint: &'a str,
    pub method: &'a str,
    pub provider: Option<ProviderKey>,
    /// Zero-based index of the final attempt.
    pub retry_count: u32,
    pub elapsed: Duration,
    pub outcome: CallOutcome<'a>,
}

/// A failed attempt that will be retried after `delay`.
#[derive(Debug, Clone, Copy)]
pub struct AttemptEvent<'a> {
    pub request_id: Uuid,
    pub endpoint: &'a str,
    /// 1-based number of the attempt that failed.
    pub attempt: u32,
    pub delay: Duration,
    pub code: ErrorCode,
    pub severity: Severity,
    /// Redacted error text.
    pub error: &'a str,
}

/// Destination for call outcome records.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Called once per logical call.
    async fn record(&self, event: &CallEvent<'_>);

    /// Called for each retried failure, before the backoff sleep. Lower
    /// severity than [`record`](Self::record).
    fn retrying(&self, event: &AttemptEvent<'_>) {
        tracing::debug!(
            request_id = %event.request_id,
            attempt = event.attempt,
            delay_ms = event.delay.as_millis() as u64,
            code = %event.code,
            "Retrying request"
        );
    }
}

/// Verbose sink for local development.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevelopmentSink;

#[async_trait]
impl LogSink for DevelopmentSink {
    async fn record(&self, event: &CallEvent<'_>) {
        let elapsed_ms = event.elapsed.as_millis() as u64;
        match event.outcome {
            CallOutcome::Success => tracing::info!(
                request_id = %event.request_id,
                endpoint = event.endpoint,
                method = event.method,
                provider = ?event.provider,
                retry_count = event.retry_count,
                elapsed_ms,
                "Call succeeded"
            ),
            CallOutcome::Failure(analysis) => {
                let technical = analysis
                    .cellar_message
                    .map(|c| c.technical.join("; "))
                    .unwrap_or_default();
                tracing::error!(
                    request_id = %event.request_id,
                    endpoint = event.endpoint,
                    method = event.method,
                    provider = ?event.provider,
                    retry_count = event.retry_count,
                    elapsed_ms,
                    code = %analysis.code,
                    severity = %analysis.severity,
                    retryable = analysis.retryable,
                    raw_error = %analysis.raw_error_redacted,
                    next_step = %analysis.next_step,
                    technical = %technical,
                    "Call failed"
                );
            }
        }
    }

    fn retrying(&self, event: &AttemptEvent<'_>) {
        tracing::warn!(
            request_id = %event.request_id,
            endpoint = event.endpoint,
            attempt = event.attempt,
            delay_ms = event.delay.as_millis() as u64,
            code = %event.code,
            error = event.error,
            "Retrying request"
        );
    }
}

/// Sink that never logs raw error text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionSink;

#[async_trait]
impl LogSink for ProductionSink {
    async fn record(&self, event: &CallEvent<'_>) {
        match event.outcome {
            CallOutcome::Success => tracing::info!(
                request_id = %event.request_id,
                retry_count = event.retry_count,
                "Call succeeded"
            ),
            CallOutcome::Failure(analysis) if analysis.is_cancelled() => tracing::info!(
                request_id = %event.request_id,
                code = %analysis.code,
                "Call cancelled"
            ),
            CallOutcome::Failure(analysis) => tracing::warn!(
                request_id = %event.request_id,
                provider = ?event.provider,
                retry_count = event.retry_count,
                code = %analysis.code,
                severity = %analysis.severity,
                user_message = %analysis.user_message(),
                "Call failed"
            ),
        }
    }
}
