//! Rule evaluation input.
//!
//! A `RuleContext` is built fresh for each authorization attempt by whoever
//! enforces the decision, and handed to rules by shared reference only.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, RulegateError};

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserIdentity {
    pub user_id: String,
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            roles: None,
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles
            .as_deref()
            .is_some_and(|roles| roles.iter().any(|r| r == role))
    }
}

/// Path/query-like parameters, kept in insertion order.
///
/// Serialized as a JSON object. Inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ParamsVisitor;

        impl<'de> Visitor<'de> for ParamsVisitor {
            type Value = Params;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of string parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Params, A::Error> {
                let mut params = Params(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    params.insert(k, v);
                }
                Ok(params)
            }
        }

        deserializer.deserialize_map(ParamsVisitor)
    }
}

/// Everything a rule may look at when deciding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleContext {
    #[serde(default)]
    pub user: Option<UserIdentity>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RuleContext {
    pub fn builder(action: impl Into<String>) -> RuleContextBuilder {
        RuleContextBuilder {
            ctx: RuleContext {
                user: None,
                action: action.into(),
                resource: None,
                key: None,
                params: None,
                body: None,
            },
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.user_id.as_str())
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.as_ref().and_then(|p| p.get(key))
    }

    /// Top-level string field of the JSON body.
    pub fn body_field(&self, field: &str) -> Option<&str> {
        self.body.as_ref()?.get(field)?.as_str()
    }

    /// Caller-side contract: a non-empty action label, and a non-empty user id
    /// when an identity is present.
    pub fn check(&self) -> Result<()> {
        if self.action.trim().is_empty() {
            return Err(RulegateError::InvalidContext("action must not be empty".into()));
        }
        if let Some(user) = &self.user {
            if user.user_id.trim().is_empty() {
                return Err(RulegateError::InvalidContext("user.userId must not be empty".into()));
            }
        }
        Ok(())
    }
}

/// Builder that enforces `RuleContext::check` on `build`.
#[derive(Debug, Clone)]
pub struct RuleContextBuilder {
    ctx: RuleContext,
}

impl RuleContextBuilder {
    pub fn user(mut self, user: UserIdentity) -> Self {
        self.ctx.user = Some(user);
        self
    }

    pub fn maybe_user(mut self, user: Option<UserIdentity>) -> Self {
        self.ctx.user = user;
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.ctx.resource = Some(resource.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.ctx.key = Some(key.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.params.get_or_insert_with(Params::new).insert(key, value);
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.ctx.params = Some(params);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.ctx.body = Some(body);
        self
    }

    pub fn build(self) -> Result<RuleContext> {
        self.ctx.check()?;
        Ok(self.ctx)
    }
}
