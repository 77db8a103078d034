//! OpenAI-specific rules. Everything else OpenAI returns is covered by the
//! generic table.

use crate::classify::code::{ErrorCode::*, Severity::*};
use crate::classify::rules::Rule;

pub(crate) const RULES: &[Rule] = &[
    Rule::new(OpenAiUnsupportedRegion, High, false).types(&["unsupported_country_region_territory"]),
    Rule::new(OpenAiInvalidOrganization, High, false).types(&["invalid_organization"]),
    Rule::new(OpenAiUnsupportedRegion, High, false)
        .statuses(&[403])
        .patterns(&["country, region, or territory", "unsupported_country"]),
    Rule::new(OpenAiOrganizationRequired, High, false)
        .statuses(&[401, 403])
        .patterns(&["must be a member of an organization"]),
    Rule::new(OpenAiInvalidOrganization, High, false)
        .statuses(&[401, 404])
        .patterns(&["no such organization", "invalid organization", "openai-organization header"]),
];
