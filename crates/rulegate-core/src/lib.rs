//! rulegate core: rule context, validation results, and error types.
//!
//! This crate defines the data contracts shared by the rule engine, rule
//! authors, and enforcement points. It carries no runtime or transport
//! dependencies so rule crates can depend on it alone.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Contract violations surface as `RulegateError`, rule failures as
//! `RuleError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod context;
pub mod error;
pub mod result;

pub use context::{Params, RuleContext, RuleContextBuilder, UserIdentity};
/// Shared result type.
pub use error::{Result, RuleError, RulegateError};
pub use result::{failure, success, RuleValidationResult, RULE_NOT_FOUND, RULE_VALIDATION_ERROR};
