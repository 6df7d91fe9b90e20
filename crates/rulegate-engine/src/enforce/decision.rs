use serde::Serialize;

use rulegate_core::RuleValidationResult;

/// Code used when a failing result carries none of its own.
pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
/// Code used when an operation has no binding and unbound operations are denied.
pub const NO_BINDING: &str = "NO_BINDING";

/// Final verdict for one attempted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// No authenticated identity in the context; rules were not consulted.
    Unauthenticated,
    Deny(DenyReason),
}

impl AccessDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    #[must_use]
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Deny(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Unauthenticated => "unauthenticated",
            Self::Deny(_) => "deny",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenyReason {
    pub code: String,
    pub message: String,
    /// Rule that produced the denial, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

/// First failing result wins; all passing (or nothing requested) allows.
///
/// `names[i]` must be the rule that produced `results[i]`.
pub fn reduce_results<S: AsRef<str>>(names: &[S], results: &[RuleValidationResult]) -> AccessDecision {
    let Some((i, denied)) = results.iter().enumerate().find(|(_, r)| !r.is_valid) else {
        return AccessDecision::Allow;
    };
    AccessDecision::Deny(DenyReason {
        code: denied.error_code().unwrap_or(ACCESS_DENIED).to_string(),
        message: denied
            .error_message
            .clone()
            .unwrap_or_else(|| "access denied".to_string()),
        rule: names.get(i).map(|n| n.as_ref().to_string()),
    })
}
