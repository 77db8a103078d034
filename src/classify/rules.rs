//! Classification rules and the tiered matcher that walks them.

use super::code::{ErrorCode, Severity};
use super::facts::ErrorFacts;

/// Matching tier, in evaluation order.
///
/// Several codes share one HTTP status and differ only by message content, so
/// the status-and-substring tier has to run before the status-only tier.
/// Substring-only rules are the last resort because nothing corroborates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    VendorType,
    StatusAndMessage,
    Status,
    Message,
}

impl Tier {
    pub const CORROBORATED: [Tier; 3] = [Tier::VendorType, Tier::StatusAndMessage, Tier::Status];
}

/// One entry in a rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub code: ErrorCode,
    pub types: &'static [&'static str],
    pub statuses: &'static [u16],
    pub patterns: &'static [&'static str],
    pub severity: Severity,
    pub retryable: bool,
}

impl Rule {
    pub const fn new(code: ErrorCode, severity: Severity, retryable: bool) -> Self {
        Self {
            code,
            types: &[],
            statuses: &[],
            patterns: &[],
            severity,
            retryable,
        }
    }

    /// Match on a vendor `type`/`code` value.
    pub const fn types(self, types: &'static [&'static str]) -> Self {
        Self { types, ..self }
    }

    pub const fn statuses(self, statuses: &'static [u16]) -> Self {
        Self { statuses, ..self }
    }

    /// Lower-case substrings searched for in the haystack.
    pub const fn patterns(self, patterns: &'static [&'static str]) -> Self {
        Self { patterns, ..self }
    }

    pub fn tier(&self) -> Tier {
        match (
            !self.types.is_empty(),
            !self.statuses.is_empty(),
            !self.patterns.is_empty(),
        ) {
            (true, _, _) => Tier::VendorType,
            (false, true, true) => Tier::StatusAndMessage,
            (false, true, false) => Tier::Status,
            (false, false, _) => Tier::Message,
        }
    }

    pub fn matches(&self, facts: &ErrorFacts) -> bool {
        let status_hit = || facts.status.is_some_and(|s| self.statuses.contains(&s));
        let pattern_hit = || self.patterns.iter().any(|p| facts.mentions(p));

        match self.tier() {
            Tier::VendorType => self.types.iter().any(|t| facts.has_kind(t)),
            Tier::StatusAndMessage => status_hit() && pattern_hit(),
            Tier::Status => status_hit(),
            Tier::Message => pattern_hit(),
        }
    }
}

/// An immutable, ordered rule table.
#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

impl Table {
    /// First rule in `tier` that matches, in table order.
    pub fn find(&self, tier: Tier, facts: &ErrorFacts) -> Option<&'static Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.tier() == tier)
            .find(|rule| rule.matches(facts))
    }

    /// Whether any rule in this table produces `code`.
    pub fn produces(&self, code: ErrorCode) -> bool {
        self.rules.iter().any(|rule| rule.code == code)
    }
}
