//! Built-in rules, declarable from config.
//!
//! Each rule reports a missing identity as `UNAUTHENTICATED` rather than
//! failing, and treats missing request data it depends on as a malformed
//! context (`RuleError::InvalidContext`).

pub mod allowlist;
pub mod field;
pub mod owner;
pub mod role;
pub mod tenant;

use std::sync::Arc;

use rulegate_core::RuleValidationResult;

use crate::config::schema::RuleSpec;
use crate::registry::{failure, Rule};

pub use allowlist::UserAllowlistRule;
pub use field::FieldMatchRule;
pub use owner::{OwnerLookup, ResourceOwnerRule, StaticOwners};
pub use role::RoleRule;
pub use tenant::TenantMatchRule;

pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
pub const USER_NOT_ALLOWED: &str = "USER_NOT_ALLOWED";
pub const MISSING_ROLE: &str = "MISSING_ROLE";
pub const TENANT_MISMATCH: &str = "TENANT_MISMATCH";
pub const NOT_OWNER: &str = "NOT_OWNER";
pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";

pub(crate) fn unauthenticated() -> RuleValidationResult {
    failure("authentication required", Some(UNAUTHENTICATED))
}

/// Instantiate a configured rule.
pub fn build_rule(spec: &RuleSpec) -> Arc<dyn Rule> {
    match spec {
        RuleSpec::UserAllowlist(s) => Arc::new(UserAllowlistRule::new(&s.name, s.users.iter().cloned())),
        RuleSpec::Role(s) => Arc::new(RoleRule::new(&s.name, s.any_of.iter().cloned())),
        RuleSpec::TenantMatch(s) => Arc::new(TenantMatchRule::new(&s.name, &s.param)),
        RuleSpec::FieldMatch(s) => Arc::new(FieldMatchRule::new(&s.name, s.source, &s.field)),
        RuleSpec::ResourceOwner(s) => Arc::new(ResourceOwnerRule::new(
            &s.name,
            Arc::new(StaticOwners::new(s.owners.clone())),
        )),
    }
}

pub fn build_rules(specs: &[RuleSpec]) -> Vec<Arc<dyn Rule>> {
    specs.iter().map(build_rule).collect()
}
