use async_trait::async_trait;

use rulegate_core::{RuleContext, RuleError};

use crate::config::schema::FieldSource;
use crate::registry::{failure, success, Rule, RuleOutcome};

use super::{unauthenticated, NOT_OWNER};

/// Passes when a params/body field carries the caller's user id
/// (e.g. `ownerId` on the record being changed).
#[derive(Debug)]
pub struct FieldMatchRule {
    name: String,
    source: FieldSource,
    field: String,
}

impl FieldMatchRule {
    pub fn new(name: impl Into<String>, source: FieldSource, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source,
            field: field.into(),
        }
    }

    fn lookup<'a>(&self, ctx: &'a RuleContext) -> Option<&'a str> {
        match self.source {
            FieldSource::Params => ctx.param(&self.field),
            FieldSource::Body => ctx.body_field(&self.field),
        }
    }
}

#[async_trait]
impl Rule for FieldMatchRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, ctx: &RuleContext) -> RuleOutcome {
        let Some(user) = &ctx.user else {
            return Ok(unauthenticated());
        };
        let value = self.lookup(ctx).ok_or_else(|| {
            RuleError::InvalidContext(format!("missing {:?} field `{}`", self.source, self.field))
        })?;

        if value == user.user_id {
            Ok(success())
        } else {
            Ok(failure(
                format!("{} does not belong to user {}", self.field, user.user_id),
                Some(NOT_OWNER),
            ))
        }
    }
}
