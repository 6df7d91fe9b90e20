//! Top-level facade crate for rulegate.
//!
//! Re-exports the core data contracts and the engine so rule authors and
//! enforcement points can depend on a single crate.

pub mod core {
    pub use rulegate_core::*;
}

pub mod engine {
    pub use rulegate_engine::*;
}

pub use rulegate_core::{failure, success, RuleContext, RuleError, RuleValidationResult, UserIdentity};
pub use rulegate_engine::registry::{Rule, RuleEngine, RuleOutcome};
