use async_trait::async_trait;

use rulegate_core::{RuleContext, RuleError};

use crate::registry::{failure, success, Rule, RuleOutcome};

use super::{unauthenticated, TENANT_MISMATCH};

/// Passes when a request parameter names the caller's own tenant.
#[derive(Debug)]
pub struct TenantMatchRule {
    name: String,
    param: String,
}

impl TenantMatchRule {
    pub fn new(name: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param: param.into(),
        }
    }
}

#[async_trait]
impl Rule for TenantMatchRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, ctx: &RuleContext) -> RuleOutcome {
        let Some(user) = &ctx.user else {
            return Ok(unauthenticated());
        };
        let tenant = ctx
            .param(&self.param)
            .ok_or_else(|| RuleError::InvalidContext(format!("missing param `{}`", self.param)))?;

        if tenant == user.tenant_id {
            Ok(success())
        } else {
            Ok(failure(
                format!("tenant {tenant} is not the caller's tenant"),
                Some(TENANT_MISMATCH),
            ))
        }
    }
}
