//! JSON batch-evaluation vector loader.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use serde::Deserialize;

use rulegate_core::RuleContext;
use rulegate_engine::config::RuleSpec;

#[derive(Debug, Deserialize)]
pub struct BatchVector {
    pub description: String,
    pub rules: Vec<RuleSpec>,
    pub context: RuleContext,
    /// `null` means "every registered rule".
    pub request: Option<Vec<String>>,
    pub expect: Vec<ExpectResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectResult {
    pub is_valid: bool,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

pub fn load(name: &str) -> BatchVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap_or_else(|e| panic!("vector {name}: {e}"))
}
