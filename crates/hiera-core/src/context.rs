//! Scope variables for path templating and `scope()` lookups
//!
//! A [`Context`] is never mutated by a lookup. Each call composes a fresh
//! context from the resolver's base context, the per-call context and the
//! per-call overrides, in that order (later wins).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named runtime variables such as `environment` or `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    vars: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Context::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// String form of a variable, as substituted into paths and strings.
    ///
    /// Strings are returned verbatim, other scalars through their JSON
    /// rendering. `null` counts as absent.
    pub fn lookup(&self, name: &str) -> Option<String> {
        match self.vars.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// A new context holding `self` overlaid with `other`; `other` wins.
    pub fn merged(&self, other: &Context) -> Context {
        let mut vars = self.vars.clone();
        vars.extend(other.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        Context { vars }
    }

    /// Compose base, per-call context and overrides into one context.
    pub fn compose(base: &Context, context: &Context, overrides: &Context) -> Context {
        base.merged(context).merged(overrides)
    }

    /// Drop falsy entries: absence, not a zero value, means "no override".
    pub fn without_falsy(&self) -> Context {
        let vars = self
            .vars
            .iter()
            .filter(|(_, v)| is_truthy(v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Context { vars }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Truthiness of a value: `null`, `false`, zero and empty containers are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
