use std::collections::HashSet;

use async_trait::async_trait;

use rulegate_core::RuleContext;

use crate::registry::{failure, success, Rule, RuleOutcome};

use super::{unauthenticated, USER_NOT_ALLOWED};

/// Passes when the caller's user id is in a fixed set.
#[derive(Debug)]
pub struct UserAllowlistRule {
    name: String,
    users: HashSet<String>,
}

impl UserAllowlistRule {
    pub fn new<I, S>(name: impl Into<String>, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            users: users.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Rule for UserAllowlistRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, ctx: &RuleContext) -> RuleOutcome {
        let Some(user) = &ctx.user else {
            return Ok(unauthenticated());
        };
        if self.users.contains(&user.user_id) {
            Ok(success())
        } else {
            Ok(failure(
                format!("user {} is not allowed to {}", user.user_id, ctx.action),
                Some(USER_NOT_ALLOWED),
            ))
        }
    }
}
