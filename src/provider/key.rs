//! Typed provider identifiers and alias handling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ErrataError;

/// Upstream services errata knows how to classify.
///
/// `Generic` stands for any plain HTTP endpoint; it has no table of its own
/// and classifies through the generic rules only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKey {
    OpenAi,
    Anthropic,
    Gemini,
    Mistral,
    DeepSeek,
    Perplexity,
    Kimi,
    Generic,
}

impl ProviderKey {
    /// Every provider, in table-evaluation-independent order.
    pub const ALL: [ProviderKey; 8] = [
        Self::OpenAi,
        Self::Anthropic,
        Self::Gemini,
        Self::Mistral,
        Self::DeepSeek,
        Self::Perplexity,
        Self::Kimi,
        Self::Generic,
    ];

    /// Canonical provider key string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Mistral => "mistral",
            Self::DeepSeek => "deepseek",
            Self::Perplexity => "perplexity",
            Self::Kimi => "kimi",
            Self::Generic => "generic",
        }
    }

    /// Parse user-facing provider aliases into a typed provider key.
    ///
    /// Matching ignores ASCII case so hints copied from headers or model
    /// strings (`"Anthropic"`, `"OpenAI"`) still resolve.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" | "chatgpt" | "gpt" | "azure" | "azure-openai" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "gemini" | "google" | "vertex" | "vertexai" => Some(Self::Gemini),
            "mistral" | "mistralai" => Some(Self::Mistral),
            "deepseek" => Some(Self::DeepSeek),
            "perplexity" | "pplx" => Some(Self::Perplexity),
            "kimi" | "moonshot" | "moonshotai" => Some(Self::Kimi),
            "generic" | "http" | "custom" => Some(Self::Generic),
            _ => None,
        }
    }

    /// Environment variable conventionally holding this provider's API key.
    pub const fn api_key_env(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::Mistral => Some("MISTRAL_API_KEY"),
            Self::DeepSeek => Some("DEEPSEEK_API_KEY"),
            Self::Perplexity => Some("PERPLEXITY_API_KEY"),
            Self::Kimi => Some("MOONSHOT_API_KEY"),
            Self::Generic => None,
        }
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKey {
    type Err = ErrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ErrataError::InvalidArgument(format!("unknown provider: {s}")))
    }
}
