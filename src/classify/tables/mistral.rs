use crate::classify::code::{ErrorCode::*, Severity::*};
use crate::classify::rules::Rule;

pub(crate) const RULES: &[Rule] = &[
    Rule::new(MistralInvalidModel, Medium, false).types(&["invalid_model"]),
    Rule::new(MistralInvalidModel, Medium, false)
        .statuses(&[400, 404])
        .patterns(&["invalid model", "model not found", "no such model"]),
    Rule::new(MistralCapacityExceeded, Medium, true)
        .statuses(&[429])
        .patterns(&["capacity exceeded", "service tier capacity"]),
    Rule::new(MistralValidationError, Medium, false).statuses(&[422]),
];
