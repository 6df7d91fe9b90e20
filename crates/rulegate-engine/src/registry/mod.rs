//! Rule registry and batch evaluation.
//!
//! Re-exports the engine and the rule capability so rule authors can depend
//! on this module directly.

pub mod engine;
pub mod rule;

pub use engine::{EvaluationMode, RuleEngine, RuleEngineBuilder};
pub use rule::{failure, success, FnRule, Rule, RuleOutcome};
