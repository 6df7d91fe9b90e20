//! rulegate engine library entry.
//!
//! This crate wires the rule registry, built-in rules, enforcement point,
//! config loader, and HTTP surface into one decision service. It is consumed
//! by the binary (`main.rs`), by programs embedding the engine, and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod enforce;
pub mod obs;
pub mod ops;
pub mod registry;
pub mod router;
pub mod rules;
pub mod transport;

pub use enforce::{AccessDecision, AccessRequest, Enforcer};
pub use registry::{Rule, RuleEngine};
