use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::join_all;
use futures_util::FutureExt;
use tracing::{debug, warn};

use rulegate_core::error::Result;
use rulegate_core::{RuleContext, RuleValidationResult};

pub use crate::config::schema::EvaluationMode;
use crate::obs::metrics::{EngineMetrics, UNREGISTERED_RULE};

use super::rule::Rule;

struct RuleEntry {
    rule: Arc<dyn Rule>,
    /// Registration order; kept when a rule is replaced under the same name.
    seq: u64,
}

/// Rule registry and batch evaluator.
///
/// Build once at startup (see [`RuleEngineBuilder`]), then share via `Arc`.
/// Registration after `seal()` is still honoured but logged, since the
/// registry is expected to be read-only while serving.
pub struct RuleEngine {
    rules: DashMap<String, RuleEntry>,
    seq: AtomicU64,
    sealed: AtomicBool,
    mode: EvaluationMode,
    metrics: Option<Arc<EngineMetrics>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::with_mode(EvaluationMode::default())
    }

    pub fn with_mode(mode: EvaluationMode) -> Self {
        Self {
            rules: DashMap::new(),
            seq: AtomicU64::new(0),
            sealed: AtomicBool::new(false),
            mode,
            metrics: None,
        }
    }

    pub fn builder() -> RuleEngineBuilder {
        RuleEngineBuilder::default()
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Mark the composition phase as finished.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Insert or replace the rule registered under `rule.name()`.
    pub fn add_rule(&self, rule: Arc<dyn Rule>) {
        let name = rule.name().to_owned();
        if self.is_sealed() {
            warn!(rule = %name, "rule registered after engine was sealed");
        }

        match self.rules.entry(name) {
            Entry::Occupied(mut e) => {
                debug!(rule = %e.key(), "rule replaced");
                e.get_mut().rule = rule;
            }
            Entry::Vacant(e) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                debug!(rule = %e.key(), seq, "rule registered");
                e.insert(RuleEntry { rule, seq });
            }
        }
    }

    /// Registered rule names, in registration order.
    pub fn registered_rules(&self) -> Vec<String> {
        let mut named: Vec<(u64, String)> = self
            .rules
            .iter()
            .map(|e| (e.value().seq, e.key().clone()))
            .collect();
        named.sort_unstable_by_key(|(seq, _)| *seq);
        named.into_iter().map(|(_, name)| name).collect()
    }

    pub fn rule_by_name(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.rules.get(name).map(|e| Arc::clone(&e.value().rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate `names` in order, or every registered rule when `names` is
    /// `None`. The result at index `i` always belongs to the `i`-th requested
    /// name. Rule failures come back as failing results; only a context that
    /// breaks the caller contract is an `Err`.
    pub async fn validate_rules<S>(
        &self,
        ctx: &RuleContext,
        names: Option<&[S]>,
    ) -> Result<Vec<RuleValidationResult>>
    where
        S: AsRef<str> + Sync,
    {
        ctx.check()?;

        let results = match names {
            Some(names) => {
                let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
                self.evaluate_batch(ctx, &names).await
            }
            None => {
                let all = self.registered_rules();
                let names: Vec<&str> = all.iter().map(String::as_str).collect();
                self.evaluate_batch(ctx, &names).await
            }
        };
        Ok(results)
    }

    pub async fn validate_all_rules(&self, ctx: &RuleContext) -> Result<Vec<RuleValidationResult>> {
        self.validate_rules::<&str>(ctx, None).await
    }

    async fn evaluate_batch(&self, ctx: &RuleContext, names: &[&str]) -> Vec<RuleValidationResult> {
        match self.mode {
            EvaluationMode::Sequential => {
                let mut out = Vec::with_capacity(names.len());
                for name in names {
                    out.push(self.evaluate_one(ctx, name).await);
                }
                out
            }
            // join_all yields outputs in input order, whatever the completion order
            EvaluationMode::Concurrent => {
                join_all(names.iter().map(|name| self.evaluate_one(ctx, name))).await
            }
        }
    }

    async fn evaluate_one(&self, ctx: &RuleContext, name: &str) -> RuleValidationResult {
        let Some(rule) = self.rule_by_name(name) else {
            warn!(rule = %name, action = %ctx.action, "requested rule is not registered");
            // requested names are caller input; keep them out of the label space
            self.record(UNREGISTERED_RULE, Outcome::NotFound, None);
            return RuleValidationResult::not_found(name);
        };

        let started = Instant::now();
        let caught = AssertUnwindSafe(rule.validate(ctx)).catch_unwind().await;
        let elapsed = started.elapsed();

        let (result, outcome) = match caught {
            Ok(Ok(result)) => {
                let outcome = if result.is_valid { Outcome::Pass } else { Outcome::Deny };
                debug!(rule = %name, valid = result.is_valid, code = ?result.error_code, "rule evaluated");
                (result, outcome)
            }
            Ok(Err(e)) => {
                warn!(rule = %name, error = %e, "rule failed");
                (RuleValidationResult::validation_error(e.to_string()), Outcome::Error)
            }
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                warn!(rule = %name, panic = %msg, "rule panicked");
                (
                    RuleValidationResult::validation_error(format!("rule panicked: {msg}")),
                    Outcome::Error,
                )
            }
        };

        self.record(name, outcome, Some(elapsed));
        result
    }

    fn record(&self, name: &str, outcome: Outcome, elapsed: Option<std::time::Duration>) {
        let Some(m) = &self.metrics else { return };
        m.rule_evaluations
            .inc(&[("rule", name), ("outcome", outcome.as_str())]);
        if let Some(d) = elapsed {
            m.rule_duration.observe(&[("rule", name)], d);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Pass,
    Deny,
    NotFound,
    Error,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Deny => "deny",
            Outcome::NotFound => "not_found",
            Outcome::Error => "error",
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Composition-phase builder. `build()` returns a sealed engine.
#[derive(Default)]
pub struct RuleEngineBuilder {
    mode: EvaluationMode,
    metrics: Option<Arc<EngineMetrics>>,
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleEngineBuilder {
    pub fn mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Rule>>,
    {
        self.rules.extend(rules);
        self
    }

    pub fn build(self) -> RuleEngine {
        let mut engine = RuleEngine::with_mode(self.mode);
        engine.metrics = self.metrics;
        for rule in self.rules {
            engine.add_rule(rule);
        }
        engine.seal();
        engine
    }
}
