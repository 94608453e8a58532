//! YAML data backend
//!
//! Documents are parsed with `serde_yaml` and converted to the JSON value
//! model. Scalar mapping keys (`1:`, `true:`) are stringified; tagged values
//! are unwrapped to their inner value.

use super::{Backend, Mapping, document_to_mapping};
use crate::{Error, Result};
use serde_json::{Number, Value};

/// Loads `.yaml` / `.yml` data files, keeping key order.
#[derive(Debug, Default, Clone)]
pub struct YamlBackend;

impl YamlBackend {
    pub const NAME: &'static str = "yaml";

    pub fn new() -> Self {
        Self
    }

    /// Parse a YAML document into a value of any shape.
    ///
    /// Merge keys (`<<: *anchor`) are flattened into their mapping.
    pub fn parse_document(raw: &[u8]) -> Result<Value> {
        let mut document: serde_yaml::Value =
            serde_yaml::from_slice(raw).map_err(|e| Self::error(e.to_string()))?;
        document
            .apply_merge()
            .map_err(|e| Self::error(e.to_string()))?;
        convert(document)
    }

    fn error(message: String) -> Error {
        Error::Parse {
            backend: Self::NAME.into(),
            message,
        }
    }
}

impl Backend for YamlBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn parse(&self, raw: &[u8]) -> Result<Mapping> {
        document_to_mapping(Self::NAME, Self::parse_document(raw)?)
    }
}

fn convert(value: serde_yaml::Value) -> Result<Value> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => convert_number(&n)?,
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(convert).collect::<Result<_>>()?)
        }
        serde_yaml::Value::Mapping(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, value) in map {
                out.insert(convert_key(key)?, convert(value)?);
            }
            Value::Object(out)
        }
        serde_yaml::Value::Tagged(tagged) => convert(tagged.value)?,
    })
}

fn convert_number(n: &serde_yaml::Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        Ok(Value::from(i))
    } else if let Some(u) = n.as_u64() {
        Ok(Value::from(u))
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| YamlBackend::error(format!("unrepresentable number: {}", n)))
    }
}

fn convert_key(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => convert_key(tagged.value),
        other => Err(YamlBackend::error(format!(
            "unsupported mapping key: {:?}",
            other
        ))),
    }
}
