//! Shared application state for the rulegate service.
//!
//! Composition happens here: configured rules plus any rules supplied by the
//! embedding program are registered, the engine is sealed, and the binding
//! table is checked against what was registered.

use std::sync::Arc;

use rulegate_core::error::{Result, RulegateError};

use crate::config::RulegateConfig;
use crate::enforce::{BindingTable, Enforcer};
use crate::obs::EngineMetrics;
use crate::registry::{Rule, RuleEngine};
use crate::rules;

const FAIL_FAST_ON_UNRESOLVED: bool = false; // if changed to true, boot fails.

#[derive(Clone)]
pub struct AppState {
    engine: Arc<RuleEngine>,
    enforcer: Arc<Enforcer>,
    metrics: Arc<EngineMetrics>,
}

impl AppState {
    pub fn new(cfg: RulegateConfig) -> Result<Self> {
        Self::with_rules(cfg, Vec::new())
    }

    /// Build state with extra code-defined rules. These are registered after
    /// the configured ones, so a same-named extra rule replaces its config
    /// counterpart.
    pub fn with_rules(cfg: RulegateConfig, extra: Vec<Arc<dyn Rule>>) -> Result<Self> {
        let metrics = Arc::new(EngineMetrics::new());

        let engine = RuleEngine::builder()
            .mode(cfg.engine.evaluation)
            .metrics(Arc::clone(&metrics))
            .rules(rules::build_rules(&cfg.rules))
            .rules(extra)
            .build();
        let engine = Arc::new(engine);

        let bindings = BindingTable::from_config(&cfg.bindings);
        for (operation, rule) in bindings.unresolved(&engine) {
            tracing::warn!(%operation, %rule, "binding refers to unregistered rule");
            if FAIL_FAST_ON_UNRESOLVED {
                return Err(RulegateError::BadRequest(format!(
                    "operation {operation} references unregistered rule: {rule}"
                )));
            }
        }

        tracing::info!(
            rules = engine.len(),
            bindings = bindings.len(),
            mode = ?engine.mode(),
            "rule engine composed"
        );

        let enforcer = Enforcer::new(Arc::clone(&engine), bindings)
            .with_unbound_policy(cfg.engine.unbound_operation)
            .with_metrics(Arc::clone(&metrics));

        Ok(Self {
            engine,
            enforcer: Arc::new(enforcer),
            metrics,
        })
    }

    pub fn engine(&self) -> Arc<RuleEngine> {
        Arc::clone(&self.engine)
    }

    pub fn enforcer(&self) -> Arc<Enforcer> {
        Arc::clone(&self.enforcer)
    }

    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.metrics)
    }
}
