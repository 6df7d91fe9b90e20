use std::collections::HashMap;

use crate::config::schema::BindingConfig;
use crate::registry::RuleEngine;

/// Rules (and optional action label) attached to one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    /// `None` evaluates every registered rule.
    pub rules: Option<Vec<String>>,
    pub action: Option<String>,
}

impl Binding {
    pub fn rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rules: Some(rules.into_iter().map(Into::into).collect()),
            action: None,
        }
    }

    pub fn all_rules() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Operation name -> binding.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    by_operation: HashMap<String, Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &[BindingConfig]) -> Self {
        let mut table = Self::new();
        for b in cfg {
            table.insert(
                b.operation.clone(),
                Binding {
                    rules: b.rules.clone(),
                    action: b.action.clone(),
                },
            );
        }
        table
    }

    pub fn insert(&mut self, operation: impl Into<String>, binding: Binding) {
        self.by_operation.insert(operation.into(), binding);
    }

    pub fn get(&self, operation: &str) -> Option<&Binding> {
        self.by_operation.get(operation)
    }

    pub fn len(&self) -> usize {
        self.by_operation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_operation.is_empty()
    }

    /// `(operation, rule)` pairs naming rules the engine does not know.
    pub fn unresolved(&self, engine: &RuleEngine) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .by_operation
            .iter()
            .flat_map(|(op, b)| b.rules.iter().flatten().map(move |r| (op, r)))
            .filter(|(_, r)| engine.rule_by_name(r).is_none())
            .map(|(op, r)| (op.clone(), r.clone()))
            .collect();
        out.sort();
        out
    }
}
