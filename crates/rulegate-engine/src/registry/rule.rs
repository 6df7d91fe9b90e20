use std::fmt;

use async_trait::async_trait;

use rulegate_core::{RuleContext, RuleError, RuleValidationResult};

pub use rulegate_core::{failure, success};

/// Outcome of a single rule: a decision, or a failure of the rule itself.
pub type RuleOutcome = std::result::Result<RuleValidationResult, RuleError>;

/// A named unit of authorization logic.
///
/// Implementations may hold injected dependencies but must not keep the
/// context they are handed, and must guard any shared mutable state
/// themselves.
#[async_trait]
pub trait Rule: Send + Sync {
    /// Registry key; must stay stable for the life of the process.
    fn name(&self) -> &str;

    async fn validate(&self, ctx: &RuleContext) -> RuleOutcome;
}

/// Adapter turning a synchronous closure into a `Rule`.
pub struct FnRule<F> {
    name: String,
    f: F,
}

impl<F> FnRule<F>
where
    F: Fn(&RuleContext) -> RuleOutcome + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Rule for FnRule<F>
where
    F: Fn(&RuleContext) -> RuleOutcome + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, ctx: &RuleContext) -> RuleOutcome {
        (self.f)(ctx)
    }
}
