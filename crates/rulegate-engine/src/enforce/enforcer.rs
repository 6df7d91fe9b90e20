use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use rulegate_core::error::{Result, RulegateError};
use rulegate_core::{Params, RuleContext, UserIdentity};

use crate::config::schema::UnboundPolicy;
use crate::obs::{EngineMetrics, UNBOUND_OPERATION};
use crate::registry::RuleEngine;

use super::bindings::BindingTable;
use super::decision::{reduce_results, AccessDecision, DenyReason, NO_BINDING};

/// Ambient request data an enforcement point has on hand.
#[derive(Debug, Clone, Default)]
pub struct AccessRequest {
    pub user: Option<UserIdentity>,
    pub resource: Option<String>,
    pub key: Option<String>,
    pub params: Option<Params>,
    pub body: Option<Value>,
}

impl AccessRequest {
    pub fn for_user(user: UserIdentity) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }
}

/// Turns per-rule results into allow/deny for bound operations.
pub struct Enforcer {
    engine: Arc<RuleEngine>,
    bindings: BindingTable,
    unbound: UnboundPolicy,
    metrics: Option<Arc<EngineMetrics>>,
}

impl Enforcer {
    pub fn new(engine: Arc<RuleEngine>, bindings: BindingTable) -> Self {
        Self {
            engine,
            bindings,
            unbound: UnboundPolicy::default(),
            metrics: None,
        }
    }

    pub fn with_unbound_policy(mut self, unbound: UnboundPolicy) -> Self {
        self.unbound = unbound;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn engine(&self) -> &Arc<RuleEngine> {
        &self.engine
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Decide whether `operation` may proceed.
    ///
    /// Operations without a binding follow the unbound policy and never
    /// consult identity. Bound operations reject a missing identity outright,
    /// then evaluate their rules. `Err` only for a malformed request.
    pub async fn authorize(&self, operation: &str, req: AccessRequest) -> Result<AccessDecision> {
        let decision = self.decide(operation, req).await?;
        if let Some(m) = &self.metrics {
            let label = if self.bindings.get(operation).is_some() {
                operation
            } else {
                UNBOUND_OPERATION
            };
            m.decisions
                .inc(&[("operation", label), ("decision", decision.as_str())]);
        }
        Ok(decision)
    }

    /// `authorize`, with denial mapped onto `RulegateError`.
    pub async fn ensure_allowed(&self, operation: &str, req: AccessRequest) -> Result<()> {
        match self.authorize(operation, req).await? {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Unauthenticated => Err(RulegateError::Unauthenticated),
            AccessDecision::Deny(reason) => Err(RulegateError::Forbidden(reason.message)),
        }
    }

    async fn decide(&self, operation: &str, req: AccessRequest) -> Result<AccessDecision> {
        let Some(binding) = self.bindings.get(operation) else {
            debug!(%operation, policy = ?self.unbound, "operation has no binding");
            return Ok(match self.unbound {
                UnboundPolicy::Allow => AccessDecision::Allow,
                UnboundPolicy::Deny => AccessDecision::Deny(DenyReason {
                    code: NO_BINDING.to_string(),
                    message: format!("no rules bound to operation {operation}"),
                    rule: None,
                }),
            });
        };

        let ctx = RuleContext {
            user: req.user,
            action: binding.action.clone().unwrap_or_else(|| operation.to_string()),
            resource: req.resource,
            key: req.key,
            params: req.params,
            body: req.body,
        };
        ctx.check()?;

        if ctx.user.is_none() {
            debug!(%operation, "rejecting anonymous request");
            return Ok(AccessDecision::Unauthenticated);
        }

        // Resolve "all rules" here so every result can be attributed to a name.
        let all;
        let names: &[String] = match &binding.rules {
            Some(rules) => rules,
            None => {
                all = self.engine.registered_rules();
                &all
            }
        };

        let results = self.engine.validate_rules(&ctx, Some(names)).await?;
        let decision = reduce_results(names, &results);

        match &decision {
            AccessDecision::Deny(reason) => info!(
                %operation,
                user = ctx.user_id().unwrap_or_default(),
                rule = reason.rule.as_deref().unwrap_or_default(),
                code = %reason.code,
                "access denied"
            ),
            _ => debug!(%operation, rules = names.len(), "access allowed"),
        }
        Ok(decision)
    }
}
