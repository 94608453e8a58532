//! Parsing of the base configuration document into backends and levels
//!
//! Backend names are resolved against a [`BackendRegistry`] once, here;
//! lookups never see an unknown backend.

use crate::backend::{Backend, BackendRegistry, Mapping, YamlBackend, kind};
use crate::template::PathTemplate;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Data directory used when a backend declares none.
pub const DEFAULT_DATADIR: &str = "/etc/puppetlabs/code/environments/%{environment}/hieradata";

const PARSE_FAILURE: &str = "Failed to parse base Hiera configuration";

/// Layout of the base configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigVersion {
    V3,
    V5,
}

impl ConfigVersion {
    /// Guess the layout from the document's keys.
    ///
    /// Colon-prefixed `:backends` / `:hierarchy` only appear in version 3.
    pub fn detect(document: &Mapping) -> Self {
        if document.contains_key(":hierarchy") || document.contains_key(":backends") {
            Self::V3
        } else {
            Self::V5
        }
    }

    fn hierarchy_key(self) -> &'static str {
        match self {
            Self::V3 => ":hierarchy",
            Self::V5 => "hierarchy",
        }
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V3 => f.write_str("3"),
            Self::V5 => f.write_str("5"),
        }
    }
}

/// A backend named by the base configuration, with its settings.
#[derive(Debug, Clone)]
pub struct DeclaredBackend {
    backend: Arc<dyn Backend>,
    datadir: PathTemplate,
    settings: Mapping,
}

impl DeclaredBackend {
    pub fn new(backend: Arc<dyn Backend>, datadir: PathTemplate) -> Self {
        Self {
            backend,
            datadir,
            settings: Mapping::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.backend.name()
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn datadir(&self) -> &PathTemplate {
        &self.datadir
    }

    /// The raw settings block the backend was declared with.
    pub fn settings(&self) -> &Mapping {
        &self.settings
    }
}

/// One level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyLevel {
    name: Option<String>,
    path: PathTemplate,
}

impl HierarchyLevel {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            name: None,
            path: PathTemplate::parse(path),
        }
    }

    /// Display name (version 5 `name:` entries).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> &PathTemplate {
        &self.path
    }
}

/// The parsed base configuration.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    version: ConfigVersion,
    backends: Vec<DeclaredBackend>,
    hierarchy: Vec<HierarchyLevel>,
}

impl BaseConfig {
    /// Parse a base configuration document.
    ///
    /// `version` forces a layout; `None` detects it. Backend names are
    /// resolved against `registry` here, once.
    pub fn parse(
        raw: &[u8],
        version: Option<ConfigVersion>,
        registry: &BackendRegistry,
    ) -> Result<Self> {
        let document = match YamlBackend::parse_document(raw) {
            Ok(Value::Object(map)) if !map.is_empty() => map,
            Ok(_) => return Err(Error::config(PARSE_FAILURE)),
            Err(e) => return Err(Error::config(format!("{}: {}", PARSE_FAILURE, e))),
        };

        let version = version.unwrap_or_else(|| ConfigVersion::detect(&document));
        let backends = Self::declared_backends(&document, version, registry)?;
        if backends.is_empty() {
            return Err(Error::NoBackends);
        }

        let entries = document
            .get(version.hierarchy_key())
            .ok_or(Error::MissingHierarchy)?;
        let hierarchy = Self::hierarchy_levels(entries)?;

        tracing::debug!(
            %version,
            backends = ?backends.iter().map(|b| b.name()).collect::<Vec<_>>(),
            levels = hierarchy.len(),
            "Loaded base hiera configuration"
        );

        Ok(Self {
            version,
            backends,
            hierarchy,
        })
    }

    pub fn version(&self) -> ConfigVersion {
        self.version
    }

    /// Declared backends, in declaration order.
    pub fn backends(&self) -> &[DeclaredBackend] {
        &self.backends
    }

    /// Hierarchy levels, highest precedence first.
    pub fn hierarchy(&self) -> &[HierarchyLevel] {
        &self.hierarchy
    }

    fn declared_backends(
        document: &Mapping,
        version: ConfigVersion,
        registry: &BackendRegistry,
    ) -> Result<Vec<DeclaredBackend>> {
        let names: Vec<String> = match version {
            ConfigVersion::V3 => match document.get(":backends") {
                None => vec![YamlBackend::NAME.to_string()],
                Some(Value::String(name)) => vec![name.clone()],
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(name) => Ok(name.clone()),
                        other => Err(Error::config(format!(
                            "backend names must be strings, found {}",
                            kind(other)
                        ))),
                    })
                    .collect::<Result<_>>()?,
                Some(other) => {
                    return Err(Error::config(format!(
                        ":backends must be a list, found {}",
                        kind(other)
                    )));
                }
            },
            ConfigVersion::V5 => vec![YamlBackend::NAME.to_string()],
        };

        let mut declared = Vec::with_capacity(names.len());
        for name in names {
            let backend = registry
                .get(&name)
                .ok_or_else(|| Error::UnknownBackend { name: name.clone() })?;

            let settings_key = match version {
                ConfigVersion::V3 => format!(":{}", name),
                ConfigVersion::V5 => "defaults".to_string(),
            };
            let settings = match document.get(&settings_key) {
                Some(Value::Object(map)) => map.clone(),
                _ => Mapping::new(),
            };
            let datadir = settings
                .get(":datadir")
                .or_else(|| settings.get("datadir"))
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_DATADIR);

            declared.push(DeclaredBackend {
                backend,
                datadir: PathTemplate::parse(datadir),
                settings,
            });
        }
        Ok(declared)
    }

    fn hierarchy_levels(entries: &Value) -> Result<Vec<HierarchyLevel>> {
        let items = match entries {
            Value::Array(items) => items.as_slice(),
            Value::String(_) => std::slice::from_ref(entries),
            other => {
                return Err(Error::config(format!(
                    "hierarchy must be a list, found {}",
                    kind(other)
                )));
            }
        };

        items
            .iter()
            .map(|entry| match entry {
                Value::String(path) => Ok(HierarchyLevel::new(path.as_str())),
                Value::Object(level) => {
                    let name = level.get("name").and_then(Value::as_str);
                    let path = level
                        .get("path")
                        .and_then(Value::as_str)
                        .or(name)
                        .ok_or_else(|| {
                            Error::config("hierarchy entry needs a `path` or `name`")
                        })?;
                    Ok(HierarchyLevel {
                        name: name.map(str::to_string),
                        path: PathTemplate::parse(path),
                    })
                }
                other => Err(Error::config(format!(
                    "hierarchy entries must be strings or mappings, found {}",
                    kind(other)
                ))),
            })
            .collect()
    }
}
