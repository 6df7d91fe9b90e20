//! Per-rule evaluation outcome.

use serde::{Deserialize, Serialize};

/// A requested rule name has no registered implementation.
pub const RULE_NOT_FOUND: &str = "RULE_NOT_FOUND";
/// A rule's own logic failed while evaluating.
pub const RULE_VALIDATION_ERROR: &str = "RULE_VALIDATION_ERROR";

/// Outcome of evaluating one rule against one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleValidationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl RuleValidationResult {
    pub fn success() -> Self {
        Self {
            is_valid: true,
            error_message: None,
            error_code: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            is_valid: false,
            error_message: Some(message.into()),
            error_code: code.map(str::to_string),
        }
    }

    pub(crate) fn tagged(message: impl Into<String>, code: &str) -> Self {
        Self::failure(message, Some(code))
    }

    pub fn not_found(rule: &str) -> Self {
        Self::tagged(format!("rule not found: {rule}"), RULE_NOT_FOUND)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::tagged(message, RULE_VALIDATION_ERROR)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }
}

/// `{isValid: true}`.
pub fn success() -> RuleValidationResult {
    RuleValidationResult::success()
}

/// `{isValid: false, errorMessage, errorCode}`.
pub fn failure(message: impl Into<String>, code: Option<&str>) -> RuleValidationResult {
    RuleValidationResult::failure(message, code)
}
