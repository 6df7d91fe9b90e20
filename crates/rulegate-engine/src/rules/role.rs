use async_trait::async_trait;

use rulegate_core::RuleContext;

use crate::registry::{failure, success, Rule, RuleOutcome};

use super::{unauthenticated, MISSING_ROLE};

/// Passes when the caller holds at least one of the listed roles.
#[derive(Debug)]
pub struct RoleRule {
    name: String,
    any_of: Vec<String>,
}

impl RoleRule {
    pub fn new<I, S>(name: impl Into<String>, any_of: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            any_of: any_of.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Rule for RoleRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, ctx: &RuleContext) -> RuleOutcome {
        let Some(user) = &ctx.user else {
            return Ok(unauthenticated());
        };
        if self.any_of.iter().any(|r| user.has_role(r)) {
            return Ok(success());
        }
        Ok(failure(
            format!("requires one of roles: {}", self.any_of.join(", ")),
            Some(MISSING_ROLE),
        ))
    }
}
