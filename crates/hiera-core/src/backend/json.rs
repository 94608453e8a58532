//! JSON data backend

use super::{Backend, Mapping, document_to_mapping};
use crate::{Error, Result};
use serde_json::Value;

/// Loads `.json` data files, keeping key order.
#[derive(Debug, Default, Clone)]
pub struct JsonBackend;

impl JsonBackend {
    pub const NAME: &'static str = "json";

    pub fn new() -> Self {
        Self
    }
}

impl Backend for JsonBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse(&self, raw: &[u8]) -> Result<Mapping> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Mapping::new());
        }
        let document: Value = serde_json::from_slice(raw).map_err(|e| Error::Parse {
            backend: Self::NAME.into(),
            message: e.to_string(),
        })?;
        document_to_mapping(Self::NAME, document)
    }
}
