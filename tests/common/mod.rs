//! Shared test helpers: a recording log sink and fast retry policies.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use errata::classify::ErrorCode;
use errata::recovery::{AttemptEvent, CallEvent, CallOutcome, LogSink};
use errata::util::retry::RetryConfig;
use uuid::Uuid;

/// Owned copy of a terminal [`CallEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub request_id: Uuid,
    pub retry_count: u32,
    pub code: Option<ErrorCode>,
    pub raw_error: Option<String>,
}

/// A sink that keeps every event for later assertions.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Recorded>>,
    attempts: Mutex<Vec<(u32, Duration, ErrorCode)>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<Recorded> {
        self.records.lock().unwrap().clone()
    }

    /// `(attempt, delay, code)` for every retried failure, in order.
    pub fn attempts(&self) -> Vec<(u32, Duration, ErrorCode)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn record(&self, event: &CallEvent<'_>) {
        let (code, raw_error) = match event.outcome {
            CallOutcome::Success => (None, None),
            CallOutcome::Failure(analysis) => {
                (Some(analysis.code), Some(analysis.raw_error_redacted.clone()))
            }
        };
        self.records.lock().unwrap().push(Recorded {
            request_id: event.request_id,
            retry_count: event.retry_count,
            code,
            raw_error,
        });
    }

    fn retrying(&self, event: &AttemptEvent<'_>) {
        self.attempts
            .lock()
            .unwrap()
            .push((event.attempt, event.delay, event.code));
    }
}

/// A retry policy with millisecond delays and no jitter.
pub fn fast_policy(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(40),
        backoff_multiplier: 2.0,
        jitter: Duration::ZERO,
    }
}
