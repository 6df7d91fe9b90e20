//! Enforcement point: operation bindings, context construction, and the
//! reduction of per-rule results into a single decision.

pub mod bindings;
pub mod decision;
pub mod enforcer;

pub use bindings::{Binding, BindingTable};
pub use decision::{reduce_results, AccessDecision, DenyReason};
pub use enforcer::{AccessRequest, Enforcer};
