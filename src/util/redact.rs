//! Masking of credentials in error text before it is stored or displayed.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Placeholder substituted for any API key.
pub const MASK: &str = "[REDACTED_API_KEY]";

struct Redaction {
    pattern: Regex,
    replacement: &'static str,
}

static REDACTIONS: LazyLock<Vec<Redaction>> = LazyLock::new(|| {
    [
        // OpenAI, Anthropic (sk-ant-), DeepSeek, Moonshot and OpenAI-style project keys.
        (r"sk-[A-Za-z0-9_-]{20,}", MASK),
        // Google API keys.
        (r"AIza[0-9A-Za-z_-]{35}", MASK),
        (r"pplx-[A-Za-z0-9]{20,}", MASK),
        (r"(?i)\bbearer\s+[A-Za-z0-9._~+/=-]{16,}", "Bearer [REDACTED]"),
        (
            r#"(?i)\b(x-api-key|x-goog-api-key|api[_-]?key|access_token)(["']?\s*[:=]\s*["']?)[^\s"'&,}]{8,}"#,
            "${1}${2}[REDACTED]",
        ),
        // user:password@ in URLs.
        (r"(?i)\b([a-z][a-z0-9+.-]*://)[^/\s:@]+:[^/\s@]+@", "${1}[REDACTED]@"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| Redaction {
        pattern: Regex::new(pattern).expect("redaction regex must compile"),
        replacement,
    })
    .collect()
});

/// Replace every credential-shaped substring in `text`.
pub fn redact(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    for redaction in REDACTIONS.iter() {
        if redaction.pattern.is_match(&out) {
            out = Cow::Owned(
                redaction
                    .pattern
                    .replace_all(&out, redaction.replacement)
                    .into_owned(),
            );
        }
    }
    out
}

/// Whether `text` still contains anything [`redact`] would mask.
pub fn contains_secret(text: &str) -> bool {
    REDACTIONS.iter().any(|r| r.pattern.is_match(text))
}
