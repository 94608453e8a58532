//! Parsed data sources, cached per path
//!
//! Each concrete source path is read and parsed at most once per cache
//! lifetime. Lookups hand out `Arc` snapshots, so a reload never changes a
//! mapping another lookup is still reading.

use crate::backend::{Backend, Mapping};
use crate::{Error, Result};
use hiera_fs::{NormalizedPath, io};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache of parsed data sources keyed by normalized path.
///
/// Readers share a read lock. Population happens under the write lock with
/// a re-check, so concurrent first loads of one path parse it once.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: RwLock<HashMap<NormalizedPath, Arc<Mapping>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path` with `backend`, returning the cached mapping on a hit.
    ///
    /// With `force_reload` the file is read and parsed again and the new
    /// mapping replaces the cached one. Read and parse failures name the
    /// path.
    pub fn load(
        &self,
        path: &NormalizedPath,
        backend: &dyn Backend,
        force_reload: bool,
    ) -> Result<Arc<Mapping>> {
        if !force_reload {
            if let Some(mapping) = self.entries.read().get(path) {
                return Ok(Arc::clone(mapping));
            }
        }

        let mut entries = self.entries.write();
        if !force_reload {
            if let Some(mapping) = entries.get(path) {
                return Ok(Arc::clone(mapping));
            }
        }

        let mapping = Arc::new(Self::read_and_parse(path, backend)?);
        tracing::debug!(%path, backend = backend.name(), keys = mapping.len(), "Loaded data source");
        entries.insert(path.clone(), Arc::clone(&mapping));
        Ok(mapping)
    }

    fn read_and_parse(path: &NormalizedPath, backend: &dyn Backend) -> Result<Mapping> {
        let load_error = |message: String| Error::Load {
            path: path.to_native(),
            message,
        };
        let raw = io::read_bytes(path).map_err(|e| match e {
            hiera_fs::Error::Io { source, .. } => load_error(source.to_string()),
            other => load_error(other.to_string()),
        })?;
        backend.parse(&raw).map_err(|e| load_error(e.to_string()))
    }

    /// The cached mapping for `path`, if loaded.
    pub fn get(&self, path: &NormalizedPath) -> Option<Arc<Mapping>> {
        self.entries.read().get(path).cloned()
    }

    pub fn contains(&self, path: &NormalizedPath) -> bool {
        self.entries.read().contains_key(path)
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every cached source.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
