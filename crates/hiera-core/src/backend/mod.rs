//! Data source backends
//!
//! A backend turns the raw bytes of one data file into an ordered mapping.
//! Backends are looked up by name in a [`BackendRegistry`] when the base
//! configuration is loaded; directory expansion picks them by extension.

mod json;
mod registry;
mod yaml;

pub use json::JsonBackend;
pub use registry::BackendRegistry;
pub use yaml::YamlBackend;

use crate::{Error, Result};
use serde_json::Value;
use std::fmt;

/// An ordered key -> value mapping, as loaded from one data source.
pub type Mapping = serde_json::Map<String, Value>;

/// A named data format capability.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Discriminator used in the base configuration (e.g. `yaml`)
    fn name(&self) -> &str;

    /// File extensions this backend owns, without the leading dot.
    ///
    /// The first one is appended to extension-less hierarchy paths first.
    fn extensions(&self) -> &[&str];

    /// Parse a whole document into an ordered mapping.
    fn parse(&self, raw: &[u8]) -> Result<Mapping>;

    /// Whether a file with this extension belongs to this backend.
    fn claims(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Convert a parsed document to the top-level mapping of a data source.
///
/// An empty document (`null`) is an empty mapping.
pub(crate) fn document_to_mapping(backend: &str, document: Value) -> Result<Mapping> {
    match document {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        other => Err(Error::Parse {
            backend: backend.to_string(),
            message: format!("top-level document must be a mapping, found {}", kind(&other)),
        }),
    }
}

/// Human-readable name of a value's shape.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
