use crate::classify::code::{ErrorCode::*, Severity::*};
use crate::classify::rules::Rule;

pub(crate) const RULES: &[Rule] = &[
    Rule::new(DeepSeekInsufficientBalance, Critical, false).types(&["insufficient_balance"]),
    Rule::new(DeepSeekServerOverloaded, High, true)
        .statuses(&[503])
        .patterns(&["overloaded", "busy"]),
    Rule::new(DeepSeekInsufficientBalance, Critical, false).statuses(&[402]),
    Rule::new(DeepSeekInvalidParameters, Medium, false).statuses(&[422]),
    Rule::new(DeepSeekServerOverloaded, High, true).statuses(&[503]),
    Rule::new(DeepSeekInsufficientBalance, Critical, false).patterns(&["insufficient balance"]),
];
