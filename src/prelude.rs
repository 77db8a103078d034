//! Convenience re-exports for common use.

pub use crate::classify::{classify, classify_with_hint, Classification, ErrorCode, Severity};
pub use crate::config::ErrataConfig;
pub use crate::error::{ErrataError, Result};
pub use crate::explain::{CellarMessage, PlainEnglish};
pub use crate::provider::ProviderKey;
pub use crate::recovery::{
    ApiErrorContext, CallEnvelope, ErrorAnalysis, LogSink, LogTier, RecoveryFacade, RequestOptions,
};
pub use crate::util::retry::{RetryConfig, RetryError, RetryManager};
pub use crate::util::throttle::RequestThrottler;
