//! Recovered calls: throttle, attempt, classify, retry, explain.
//!
//! [`RecoveryFacade::call`] is the single boundary where failures stop being
//! errors and become [`ErrorAnalysis`] values. Each logical call gets one
//! request id, shares the facade's throttler with every other call, and
//! produces exactly one sink record however many attempts it took.

mod analysis;
mod sink;

pub use analysis::{ApiErrorContext, ErrorAnalysis};
pub use sink::{
    AttemptEvent, CallEvent, CallOutcome, DevelopmentSink, LogSink, LogTier, ProductionSink,
};

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bon::Builder;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::classify::{classify, RawError, RetryFamily};
use crate::config::ErrataConfig;
use crate::error::ErrataError;
use crate::provider::{http, ProviderKey};
use crate::util::redact::redact;
use crate::util::retry::{RetryConfig, RetryError, RetryManager, RetryPlan};
use crate::util::throttle::RequestThrottler;
use crate::util::timeout::with_timeout;

/// Per-call options.
#[derive(Debug, Clone, Builder)]
pub struct RequestOptions {
    #[builder(into)]
    pub endpoint: String,
    #[builder(default = Method::POST)]
    pub method: Method,
    /// Selects the provider classification table and auth header style.
    pub provider: Option<ProviderKey>,
    /// JSON body for [`RecoveryFacade::call_json`].
    pub body: Option<Value>,
    /// Extra headers for [`RecoveryFacade::call_json`]; these win over the
    /// configured auth headers.
    #[builder(default)]
    pub headers: HeaderMap,
    /// Per-attempt deadline, overriding the configured one.
    pub timeout: Option<Duration>,
    /// Used for every retryable failure instead of the per-family presets.
    pub retry_policy: Option<RetryConfig>,
    #[builder(default)]
    pub cancel: CancellationToken,
}

/// `{data, success: true}` or `{error, success: false}`.
#[derive(Debug, Clone, Serialize)]
pub struct CallEnvelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorAnalysis>,
    pub success: bool,
}

impl<T> From<Result<T, ErrorAnalysis>> for CallEnvelope<T> {
    fn from(result: Result<T, ErrorAnalysis>) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                error: None,
                success: true,
            },
            Err(error) => Self {
                data: None,
                error: Some(error),
                success: false,
            },
        }
    }
}

/// Runs calls under throttling and classification-driven retries.
pub struct RecoveryFacade {
    config: ErrataConfig,
    throttler: Arc<RequestThrottler>,
    sink: Arc<dyn LogSink>,
    retry: RetryManager,
}

impl fmt::Debug for RecoveryFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryFacade")
            .field("config", &self.config)
            .field("throttler", &self.throttler)
            .field("sink", &"..")
            .finish()
    }
}

impl Default for RecoveryFacade {
    fn default() -> Self {
        Self::new(ErrataConfig::default())
    }
}

impl RecoveryFacade {
    pub fn new(config: ErrataConfig) -> Self {
        let retry = [
            RetryFamily::RateLimit,
            RetryFamily::ServerError,
            RetryFamily::Connection,
        ]
        .into_iter()
        .fold(RetryManager::new(RetryConfig::no_retry()), |manager, family| {
            manager.with_policy(family.to_string(), config.retry_policy(family).clone())
        });

        Self {
            throttler: Arc::new(RequestThrottler::new(config.max_requests_per_second)),
            sink: config.log_tier.sink(),
            retry,
            config,
        }
    }

    /// A facade configured from the environment.
    pub fn from_env() -> Result<Self, ErrataError> {
        Ok(Self::new(ErrataConfig::from_env()?))
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Share a throttler with other facades, e.g. one per provider.
    pub fn with_throttler(mut self, throttler: Arc<RequestThrottler>) -> Self {
        self.throttler = throttler;
        self
    }

    pub fn throttler(&self) -> &Arc<RequestThrottler> {
        &self.throttler
    }

    pub fn config(&self) -> &ErrataConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails for good, or is cancelled.
    ///
    /// Every attempt first waits on the throttler, then runs under the
    /// per-attempt deadline. Failures are classified against the request's
    /// provider; only retryable codes are retried, with the preset for their
    /// family. Slow-down codes also derate the throttler, and each success
    /// steps the rate back up.
    pub async fn call<T, F, Fut>(
        &self,
        options: &RequestOptions,
        operation: F,
    ) -> Result<T, ErrorAnalysis>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ErrataError>>,
    {
        let started = Instant::now();
        let context = ApiErrorContext::new(&options.endpoint, options.method.as_str())
            .with_provider(options.provider);
        let request_id = context.request_id;
        let key = format!("{} {}", options.method, options.endpoint);
        let timeout = options.timeout.unwrap_or(self.config.attempt_timeout);
        let provider = options.provider;

        let last_attempt = AtomicU32::new(0);
        let last_attempt_ref = &last_attempt;
        let throttler: &RequestThrottler = &self.throttler;
        // The operation is only invoked once the throttler admits the attempt.
        let operation = Mutex::new(operation);
        let operation_ref = &operation;

        let outcome = self
            .retry
            .execute_with_policy(
                &key,
                &options.cancel,
                move |attempt| {
                    last_attempt_ref.store(attempt, Ordering::Relaxed);
                    async move {
                        throttler.throttle().await;
                        let attempt_future = {
                            let mut operation = operation_ref
                                .lock()
                                .unwrap_or_else(|poisoned| poisoned.into_inner());
                            (*operation)()
                        };
                        with_timeout(timeout, attempt_future).await
                    }
                },
                |error: &ErrataError| self.plan_retry(error, options),
                |attempt, delay, error| {
                    let classification = classify(error, provider);
                    let text = error.raw_text();
                    self.sink.retrying(&AttemptEvent {
                        request_id,
                        endpoint: &options.endpoint,
                        attempt,
                        delay,
                        code: classification.code,
                        severity: classification.severity,
                        error: &redact(&text),
                    });
                },
            )
            .await;

        let analysis = match outcome {
            Ok(value) => {
                self.throttler.gradually_increase_rate();
                let retry_count = last_attempt.load(Ordering::Relaxed).saturating_sub(1);
                let context = context.with_retry_count(retry_count);
                self.emit(&context, started, CallOutcome::Success).await;
                return Ok(value);
            }
            Err(err) => {
                let context = context.with_retry_count(err.attempts().saturating_sub(1));
                match err {
                    RetryError::Cancelled { .. } => ErrorAnalysis::cancelled(context),
                    RetryError::Exhausted { error, .. } => {
                        Self::analyze(&error, provider, context, true)
                    }
                    RetryError::Rejected { error, .. } => {
                        Self::analyze(&error, provider, context, false)
                    }
                }
            }
        };

        self.emit(&analysis.context, started, CallOutcome::Failure(&analysis))
            .await;
        Err(analysis)
    }

    /// [`call`](Self::call), wrapped in a [`CallEnvelope`].
    pub async fn call_envelope<T, F, Fut>(
        &self,
        options: &RequestOptions,
        operation: F,
    ) -> CallEnvelope<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ErrataError>>,
    {
        self.call(options, operation).await.into()
    }

    /// Perform `options` as a JSON HTTP request with recovery.
    ///
    /// Auth headers come from the configured API key for `options.provider`.
    pub async fn call_json(&self, options: &RequestOptions) -> Result<Value, ErrorAnalysis> {
        let headers = self.request_headers(options);
        self.call(options, || {
            http::send_json(
                options.method.clone(),
                &options.endpoint,
                headers.clone(),
                options.body.as_ref(),
            )
        })
        .await
    }

    fn plan_retry(&self, error: &ErrataError, options: &RequestOptions) -> Option<RetryPlan> {
        let classification = classify(error, options.provider);
        if classification.code.signals_slow_down() {
            self.throttler
                .enter_throttle_mode(Some(self.config.slow_down_cooldown));
        }
        if !classification.retryable {
            return None;
        }
        let family = classification.code.family()?;
        let config = options
            .retry_policy
            .clone()
            .unwrap_or_else(|| self.retry.policy(&family.to_string()).clone());
        Some(RetryPlan::new(config).with_min_delay(error.retry_after()))
    }

    fn request_headers(&self, options: &RequestOptions) -> HeaderMap {
        let mut headers = match options
            .provider
            .and_then(|p| self.config.api_key(p).map(|key| (p, key)))
        {
            Some((provider, key)) => http::auth_headers(provider, key),
            None => {
                let mut headers = HeaderMap::new();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers
            }
        };
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    fn analyze(
        error: &ErrataError,
        provider: Option<ProviderKey>,
        context: ApiErrorContext,
        retries_exhausted: bool,
    ) -> ErrorAnalysis {
        ErrorAnalysis::from_classification(
            &error.raw_text(),
            classify(error, provider),
            context,
            retries_exhausted,
        )
    }

    async fn emit(&self, context: &ApiErrorContext, started: Instant, outcome: CallOutcome<'_>) {
        self.sink
            .record(&CallEvent {
                request_id: context.request_id,
                endpoint: &context.endpoint,
                method: &context.method,
                provider: context.provider,
                retry_count: context.retry_count,
                elapsed: started.elapsed(),
                outcome,
            })
            .await;
    }
}
