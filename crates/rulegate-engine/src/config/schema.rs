use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use serde::Deserialize;
use rulegate_core::error::{Result, RulegateError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulegateConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub rules: Vec<RuleSpec>,

    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

impl RulegateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RulegateError::UnsupportedVersion);
        }

        self.server.validate()?;

        let mut names = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if !names.insert(rule.name()) {
                return Err(RulegateError::BadRequest(format!(
                    "duplicate rule name: {}",
                    rule.name()
                )));
            }
        }

        let mut operations = HashSet::new();
        for b in &self.bindings {
            b.validate()?;
            if !operations.insert(b.operation.as_str()) {
                return Err(RulegateError::BadRequest(format!(
                    "duplicate binding for operation: {}",
                    b.operation
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            RulegateError::BadRequest(format!(
                "server.listen must be a valid socket address: {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    #[serde(default)]
    pub evaluation: EvaluationMode,

    #[serde(default)]
    pub unbound_operation: UnboundPolicy,
}

/// How a batch runs its rules. Result order is the same either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    #[default]
    Sequential,
    Concurrent,
}

/// Decision for an operation that has no binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnboundPolicy {
    #[default]
    Allow,
    Deny,
}

/// Built-in rule declaration, selected by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    UserAllowlist(UserAllowlistSpec),
    Role(RoleSpec),
    TenantMatch(TenantMatchSpec),
    FieldMatch(FieldMatchSpec),
    ResourceOwner(ResourceOwnerSpec),
}

impl RuleSpec {
    pub fn name(&self) -> &str {
        match self {
            RuleSpec::UserAllowlist(s) => &s.name,
            RuleSpec::Role(s) => &s.name,
            RuleSpec::TenantMatch(s) => &s.name,
            RuleSpec::FieldMatch(s) => &s.name,
            RuleSpec::ResourceOwner(s) => &s.name,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.name();
        if name.trim().is_empty() {
            return Err(RulegateError::BadRequest("rule name must not be empty".into()));
        }
        match self {
            RuleSpec::Role(s) if s.any_of.is_empty() => Err(RulegateError::BadRequest(format!(
                "rule {name}: any_of must not be empty"
            ))),
            RuleSpec::TenantMatch(s) if s.param.is_empty() => Err(RulegateError::BadRequest(
                format!("rule {name}: param must not be empty"),
            )),
            RuleSpec::FieldMatch(s) if s.field.is_empty() => Err(RulegateError::BadRequest(
                format!("rule {name}: field must not be empty"),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAllowlistSpec {
    pub name: String,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleSpec {
    pub name: String,
    pub any_of: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantMatchSpec {
    pub name: String,
    #[serde(default = "default_tenant_param")]
    pub param: String,
}

fn default_tenant_param() -> String {
    "tenantId".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Params,
    Body,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMatchSpec {
    pub name: String,
    pub source: FieldSource,
    pub field: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceOwnerSpec {
    pub name: String,
    /// `"<resource>/<key>"` -> owning user id.
    #[serde(default)]
    pub owners: HashMap<String, String>,
}

/// Declarative association between an operation and its rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    pub operation: String,
    /// Omitted: every registered rule.
    #[serde(default)]
    pub rules: Option<Vec<String>>,
    /// Action label handed to rules; defaults to the operation name.
    #[serde(default)]
    pub action: Option<String>,
}

impl BindingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.operation.trim().is_empty() {
            return Err(RulegateError::BadRequest("binding operation must not be empty".into()));
        }
        if let Some(rules) = &self.rules {
            if rules.iter().any(|r| r.trim().is_empty()) {
                return Err(RulegateError::BadRequest(format!(
                    "binding {}: rule names must not be empty",
                    self.operation
                )));
            }
        }
        if self.action.as_deref().is_some_and(|a| a.trim().is_empty()) {
            return Err(RulegateError::BadRequest(format!(
                "binding {}: action must not be empty when set",
                self.operation
            )));
        }
        Ok(())
    }
}
