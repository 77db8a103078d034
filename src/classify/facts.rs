//! Normalization of raw error shapes into the facts classification runs on.
//!
//! Provider SDKs and HTTP bodies disagree about where the status, vendor type,
//! and message live. Everything is probed once here so rules never have to
//! look at the raw value again.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ErrataError;

/// Upper bound on the bytes of any single field fed into matching.
pub const MAX_MATCH_BYTES: usize = 16 * 1024;

static STATUS_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([45]\d{2})\b").expect("status extraction regex must compile")
});

/// Where the HTTP status in [`ErrorFacts`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// An explicit `status`/`statusCode`/`code` field or transport status.
    Field,
    /// Mined from the message text.
    Text,
}

/// The normalized view of a raw error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFacts {
    pub status: Option<u16>,
    pub status_source: Option<StatusSource>,
    /// Lower-cased vendor `type`/`code`/`status` strings.
    pub kinds: Vec<String>,
    /// Best human-readable message, truncated.
    pub message: String,
    /// Lower-cased message, kinds, and body used for substring matching.
    pub haystack: String,
}

impl ErrorFacts {
    /// Facts from a bare message.
    pub fn from_message(message: &str) -> Self {
        FactsBuilder::default().message(message).finish()
    }

    /// Facts from a JSON error value of any supported shape.
    ///
    /// Understands `{statusCode|status|code, message, type}` at the top level,
    /// the same fields nested under `error`, and `error` given as a string.
    pub fn from_value(value: &Value) -> Self {
        let mut builder = FactsBuilder::default();

        match value {
            Value::String(s) => return builder.message(s).finish(),
            Value::Object(_) => {}
            other => return builder.message(&other.to_string()).finish(),
        }

        builder.probe_object(value);
        if let Some(inner) = value.get("error") {
            match inner {
                Value::Object(_) => builder.probe_object(inner),
                Value::String(s) => builder.message_if_empty(s),
                _ => {}
            }
        }
        for pointer in ["/promptFeedback/blockReason", "/candidates/0/finishReason"] {
            if let Some(Value::String(reason)) = value.pointer(pointer) {
                builder.kind(reason);
            }
        }
        builder.body(value);
        builder.finish()
    }

    /// Whether any vendor kind equals `kind` (already lower-case).
    pub fn has_kind(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| k == kind)
    }

    /// Whether the haystack contains `needle` (already lower-case).
    pub fn mentions(&self, needle: &str) -> bool {
        self.haystack.contains(needle)
    }
}

/// Anything errata can classify.
///
/// Implemented for the crate's own error type, raw JSON values, and plain
/// strings. Callers with their own error types can implement it by building
/// [`ErrorFacts`] directly.
pub trait RawError {
    fn facts(&self) -> ErrorFacts;

    /// The error rendered as text, before any redaction.
    fn raw_text(&self) -> String;
}

impl RawError for ErrorFacts {
    fn facts(&self) -> ErrorFacts {
        self.clone()
    }

    fn raw_text(&self) -> String {
        self.message.clone()
    }
}

impl RawError for Value {
    fn facts(&self) -> ErrorFacts {
        ErrorFacts::from_value(self)
    }

    fn raw_text(&self) -> String {
        truncate(&self.to_string()).to_string()
    }
}

impl RawError for str {
    fn facts(&self) -> ErrorFacts {
        ErrorFacts::from_message(self)
    }

    fn raw_text(&self) -> String {
        truncate(self).to_string()
    }
}

impl RawError for String {
    fn facts(&self) -> ErrorFacts {
        ErrorFacts::from_message(self)
    }

    fn raw_text(&self) -> String {
        truncate(self).to_string()
    }
}

impl RawError for ErrataError {
    fn raw_text(&self) -> String {
        let text = match self {
            ErrataError::Api {
                body: Some(body), ..
            } => format!("{self} {body}"),
            other => other.to_string(),
        };
        truncate(&text).to_string()
    }

    fn facts(&self) -> ErrorFacts {
        match self {
            ErrataError::Api {
                status,
                message,
                body,
                ..
            } => {
                let mut builder = FactsBuilder::default();
                // The transport status is authoritative over any status echoed in the body.
                builder.status_field(*status);
                if let Some(body) = body {
                    builder.probe_object(body);
                    if let Some(inner) = body.get("error").filter(|v| v.is_object()) {
                        builder.probe_object(inner);
                    }
                    builder.body(body);
                }
                builder.message_if_empty(message);
                builder.finish()
            }
            ErrataError::Network(e) => {
                let mut builder = FactsBuilder::default();
                if e.is_timeout() {
                    builder.kind("timeout");
                } else if e.is_connect() {
                    builder.kind("connection_error");
                }
                if let Some(status) = e.status() {
                    builder.status_field(status.as_u16());
                }
                builder.message(&e.to_string()).finish()
            }
            ErrataError::Timeout(_) => {
                let mut builder = FactsBuilder::default();
                builder.kind("timeout");
                builder.message(&self.to_string()).finish()
            }
            ErrataError::Io(e) => {
                let mut builder = FactsBuilder::default();
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::ConnectionRefused
                        | std::io::ErrorKind::ConnectionReset
                        | std::io::ErrorKind::ConnectionAborted
                ) {
                    builder.kind("connection_error");
                } else if e.kind() == std::io::ErrorKind::TimedOut {
                    builder.kind("timeout");
                }
                builder.message(&e.to_string()).finish()
            }
            ErrataError::Upstream(value) => ErrorFacts::from_value(value),
            other => ErrorFacts::from_message(&other.to_string()),
        }
    }
}

#[derive(Default)]
struct FactsBuilder {
    status: Option<u16>,
    status_source: Option<StatusSource>,
    kinds: Vec<String>,
    message: String,
    body: Option<String>,
}

impl FactsBuilder {
    fn message(mut self, message: &str) -> Self {
        self.message = truncate(message).to_string();
        self
    }

    fn message_if_empty(&mut self, message: &str) {
        if self.message.is_empty() && !message.is_empty() {
            self.message = truncate(message).to_string();
        }
    }

    fn kind(&mut self, kind: &str) {
        let kind = kind.trim().to_lowercase();
        if !kind.is_empty() && !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
    }

    fn status_field(&mut self, status: u16) {
        if self.status_source != Some(StatusSource::Field) {
            self.status = Some(status);
            self.status_source = Some(StatusSource::Field);
        }
    }

    fn body(&mut self, value: &Value) {
        self.body = Some(truncate(&value.to_string()).to_lowercase());
    }

    /// Pull status, kinds, and message out of one JSON object level.
    fn probe_object(&mut self, value: &Value) {
        for field in ["statusCode", "status_code", "status", "code"] {
            match value.get(field) {
                Some(Value::Number(n)) => {
                    if let Some(status) = n.as_u64().and_then(as_http_status) {
                        self.status_field(status);
                    }
                }
                Some(Value::String(s)) => match s.parse::<u16>().ok().and_then(|n| as_http_status(n.into())) {
                    Some(status) => self.status_field(status),
                    None => self.kind(s),
                },
                _ => {}
            }
        }
        if let Some(Value::String(kind)) = value.get("type") {
            self.kind(kind);
        }
        if let Some(Value::String(message)) = value.get("message") {
            self.message_if_empty(message);
        }
    }

    fn finish(mut self) -> ErrorFacts {
        if self.status.is_none() {
            if let Some(status) = status_from_text(&self.message) {
                self.status = Some(status);
                self.status_source = Some(StatusSource::Text);
            }
        }

        let mut haystack = self.message.to_lowercase();
        for kind in &self.kinds {
            haystack.push(' ');
            haystack.push_str(kind);
        }
        if let Some(body) = &self.body {
            haystack.push(' ');
            haystack.push_str(body);
        }

        ErrorFacts {
            status: self.status,
            status_source: self.status_source,
            kinds: self.kinds,
            message: self.message,
            haystack,
        }
    }
}

fn as_http_status(n: u64) -> Option<u16> {
    (100..=599).contains(&n).then_some(n as u16)
}

/// First 4xx/5xx-looking number in `text`.
fn status_from_text(text: &str) -> Option<u16> {
    STATUS_IN_TEXT
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Cut `text` to at most [`MAX_MATCH_BYTES`] on a char boundary.
pub(crate) fn truncate(text: &str) -> &str {
    if text.len() <= MAX_MATCH_BYTES {
        return text;
    }
    let mut end = MAX_MATCH_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
