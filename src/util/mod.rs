//! Utility modules: retry, throttling, timeout, redaction.

pub mod redact;
pub mod retry;
pub mod throttle;
pub mod timeout;
