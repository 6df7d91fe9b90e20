use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use rulegate_core::{RuleContext, RuleError};

use crate::registry::{failure, success, Rule, RuleOutcome};

use super::{unauthenticated, NOT_OWNER, RESOURCE_NOT_FOUND};

/// Source of record ownership, typically backed by the application's store.
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    /// Owning user id of `resource/key`, or `None` when the record is unknown.
    async fn owner_of(&self, resource: &str, key: &str) -> Result<Option<String>, RuleError>;
}

/// Fixed ownership table keyed by `"<resource>/<key>"`.
#[derive(Debug, Default)]
pub struct StaticOwners {
    owners: HashMap<String, String>,
}

impl StaticOwners {
    pub fn new(owners: HashMap<String, String>) -> Self {
        Self { owners }
    }
}

#[async_trait]
impl OwnerLookup for StaticOwners {
    async fn owner_of(&self, resource: &str, key: &str) -> Result<Option<String>, RuleError> {
        Ok(self.owners.get(&format!("{resource}/{key}")).cloned())
    }
}

/// Passes when the caller owns the addressed record.
pub struct ResourceOwnerRule {
    name: String,
    lookup: Arc<dyn OwnerLookup>,
}

impl ResourceOwnerRule {
    pub fn new(name: impl Into<String>, lookup: Arc<dyn OwnerLookup>) -> Self {
        Self {
            name: name.into(),
            lookup,
        }
    }
}

#[async_trait]
impl Rule for ResourceOwnerRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, ctx: &RuleContext) -> RuleOutcome {
        let Some(user) = &ctx.user else {
            return Ok(unauthenticated());
        };
        let (Some(resource), Some(key)) = (ctx.resource.as_deref(), ctx.key.as_deref()) else {
            return Err(RuleError::InvalidContext(
                "resource and key are required for ownership checks".into(),
            ));
        };

        match self.lookup.owner_of(resource, key).await? {
            None => Ok(failure(
                format!("{resource}/{key} not found"),
                Some(RESOURCE_NOT_FOUND),
            )),
            Some(owner) if owner == user.user_id => Ok(success()),
            Some(_) => Ok(failure(
                format!("{resource}/{key} is not owned by user {}", user.user_id),
                Some(NOT_OWNER),
            )),
        }
    }
}
