//! Retry with exponential backoff and jitter.
//!
//! Each call to [`RetryManager::execute_with_retry`] runs its own state
//! machine; calls sharing a key are not serialized against each other. Whether
//! an error is worth retrying is decided by the caller, not here.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Upper bound of the random term added to every delay by default.
pub const DEFAULT_JITTER: Duration = Duration::from_millis(100);

/// Backoff policy for one failure family.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Upper bound of the random term added to each delay.
    pub jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_multiplier: 2.0,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl RetryConfig {
    /// 429-style limits clear quickly; keep the ceiling low.
    pub fn rate_limit() -> Self {
        Self::default()
    }

    /// Overload and 5xx failures get more attempts and a higher ceiling.
    pub fn server_error() -> Self {
        Self {
            max_retries: 4,
            max_delay: Duration::from_millis(32_000),
            ..Self::default()
        }
    }

    pub fn connection() -> Self {
        Self {
            max_retries: 3,
            max_delay: Duration::from_millis(16_000),
            ..Self::default()
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// `min(base * multiplier^retry + jitter_fraction * jitter, max)`.
    ///
    /// `retry` is zero for the delay before the first retry.
    pub fn backoff_delay(&self, retry: u32, jitter_fraction: f64) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let raw = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent)
            + self.jitter.as_secs_f64() * jitter_fraction.clamp(0.0, 1.0);
        let capped = raw.min(self.max_delay.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
        } else {
            Duration::ZERO
        }
    }

    /// Delay before retry number `retry`, with fresh jitter.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff_delay(retry, rand_factor())
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPlan {
    pub config: RetryConfig,
    /// Wait at least this long, e.g. from a `Retry-After` header. Still capped
    /// at `config.max_delay`.
    pub min_delay: Option<Duration>,
}

impl RetryPlan {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            min_delay: None,
        }
    }

    pub fn with_min_delay(mut self, min_delay: Option<Duration>) -> Self {
        self.min_delay = min_delay;
        self
    }

    fn delay_for(&self, retry: u32) -> Duration {
        let delay = self.config.delay_for(retry);
        match self.min_delay {
            Some(min) => delay.max(min).min(self.config.max_delay),
            None => delay,
        }
    }
}

/// Terminal failure of a retried operation.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The last attempt failed and the policy allowed no more.
    #[error("gave up after {attempts} attempts: {error}")]
    Exhausted { error: E, attempts: u32 },

    /// The error was not retryable; `attempts` includes the failing one.
    #[error("non-retryable failure on attempt {attempts}: {error}")]
    Rejected { error: E, attempts: u32 },

    /// The cancellation token fired during an attempt or a backoff sleep.
    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    /// Attempts started before the operation ended.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. }
            | Self::Rejected { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }

    /// The last operation error, unless the run was cancelled.
    pub fn into_error(self) -> Option<E> {
        match self {
            Self::Exhausted { error, .. } | Self::Rejected { error, .. } => Some(error),
            Self::Cancelled { .. } => None,
        }
    }
}

/// Runs operations under named retry policies.
#[derive(Debug, Clone, Default)]
pub struct RetryManager {
    default_policy: RetryConfig,
    policies: HashMap<String, RetryConfig>,
}

impl RetryManager {
    pub fn new(default_policy: RetryConfig) -> Self {
        Self {
            default_policy,
            policies: HashMap::new(),
        }
    }

    /// Register a policy for `key`.
    pub fn with_policy(mut self, key: impl Into<String>, policy: RetryConfig) -> Self {
        self.policies.insert(key.into(), policy);
        self
    }

    /// Policy registered for `key`, or the default.
    pub fn policy(&self, key: &str) -> &RetryConfig {
        self.policies.get(key).unwrap_or(&self.default_policy)
    }

    /// Run `operation` under the policy registered for `key`.
    ///
    /// `operation` receives the 1-based attempt number. `on_attempt` is called
    /// after each failure that will be retried, with that attempt's number,
    /// the upcoming delay, and the error.
    pub async fn execute_with_retry<T, E, F, Fut, P, A>(
        &self,
        key: &str,
        operation: F,
        mut should_retry: P,
        on_attempt: A,
    ) -> Result<T, RetryError<E>>
    where
        E: fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(&E) -> bool,
        A: FnMut(u32, Duration, &E),
    {
        let policy = self.policy(key).clone();
        self.execute_with_policy(
            key,
            &CancellationToken::new(),
            operation,
            |error| should_retry(error).then(|| RetryPlan::new(policy.clone())),
            on_attempt,
        )
        .await
    }

    /// Run `operation`, letting `decide` pick the plan after every failure.
    ///
    /// Returning `None` from `decide` stops immediately. Cancelling `cancel`
    /// aborts the in-flight attempt or backoff sleep.
    pub async fn execute_with_policy<T, E, F, Fut, D, A>(
        &self,
        key: &str,
        cancel: &CancellationToken,
        mut operation: F,
        mut decide: D,
        mut on_attempt: A,
    ) -> Result<T, RetryError<E>>
    where
        E: fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        D: FnMut(&E) -> Option<RetryPlan>,
        A: FnMut(u32, Duration, &E),
    {
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled { attempts: attempt });
            }
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(key, attempt, "Attempt cancelled");
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
                result = operation(attempt) => result,
            };

            let error = match result {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(key, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let Some(plan) = decide(&error) else {
                return Err(RetryError::Rejected {
                    error,
                    attempts: attempt,
                });
            };

            let retry = attempt - 1;
            if retry >= plan.config.max_retries {
                tracing::warn!(
                    key,
                    attempts = attempt,
                    error = %error,
                    "Retries exhausted"
                );
                return Err(RetryError::Exhausted {
                    error,
                    attempts: attempt,
                });
            }

            let delay = plan.delay_for(retry);
            tracing::warn!(
                key,
                attempt,
                max_retries = plan.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying after error"
            );
            on_attempt(attempt, delay, &error);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(key, attempt, "Backoff cancelled");
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

/// Simple pseudo-random factor [0, 1) without pulling in rand crate.
fn rand_factor() -> f64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .hash(&mut hasher);
    std::thread::current().id().hash(&mut hasher);

    let hash = hasher.finish();
    (hash % 10000) as f64 / 10000.0
}
