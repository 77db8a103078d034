//! Static rule tables: one generic table and one per provider.

mod anthropic;
mod deepseek;
mod generic;
mod gemini;
mod kimi;
mod mistral;
mod openai;
mod perplexity;

use super::rules::Table;
use crate::provider::ProviderKey;

pub static GENERIC: Table = Table {
    name: "generic",
    rules: generic::RULES,
};

pub static OPENAI: Table = Table {
    name: "openai",
    rules: openai::RULES,
};

pub static ANTHROPIC: Table = Table {
    name: "anthropic",
    rules: anthropic::RULES,
};

pub static GEMINI: Table = Table {
    name: "gemini",
    rules: gemini::RULES,
};

pub static MISTRAL: Table = Table {
    name: "mistral",
    rules: mistral::RULES,
};

pub static DEEPSEEK: Table = Table {
    name: "deepseek",
    rules: deepseek::RULES,
};

pub static PERPLEXITY: Table = Table {
    name: "perplexity",
    rules: perplexity::RULES,
};

pub static KIMI: Table = Table {
    name: "kimi",
    rules: kimi::RULES,
};

/// The specialized table for `provider`, if it has one.
pub fn for_provider(provider: ProviderKey) -> Option<&'static Table> {
    match provider {
        ProviderKey::OpenAi => Some(&OPENAI),
        ProviderKey::Anthropic => Some(&ANTHROPIC),
        ProviderKey::Gemini => Some(&GEMINI),
        ProviderKey::Mistral => Some(&MISTRAL),
        ProviderKey::DeepSeek => Some(&DEEPSEEK),
        ProviderKey::Perplexity => Some(&PERPLEXITY),
        ProviderKey::Kimi => Some(&KIMI),
        ProviderKey::Generic => None,
    }
}

/// Every table, generic first.
pub fn all() -> [&'static Table; 8] {
    [
        &GENERIC,
        &OPENAI,
        &ANTHROPIC,
        &GEMINI,
        &MISTRAL,
        &DEEPSEEK,
        &PERPLEXITY,
        &KIMI,
    ]
}
