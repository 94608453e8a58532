//! Hierarchy expansion: context -> ordered data sources
//!
//! For each declared backend (in order), for each hierarchy level (in
//! order), the backend's data directory and the level's path are rendered
//! against the context and joined onto the base directory:
//!
//! 1. a template referencing a missing variable skips the pair;
//! 2. a directory is walked, every file claimed by the current backend
//!    becomes a source;
//! 3. a file (as written, or with one of the backend's extensions
//!    appended) becomes a source;
//! 4. anything else contributes nothing.
//!
//! The result is recomputed per lookup because the context varies per call.

use crate::backend::{Backend, Mapping};
use crate::cache::SourceCache;
use crate::config::{BaseConfig, DeclaredBackend, HierarchyLevel};
use crate::context::Context;
use crate::Result;
use hiera_fs::{NormalizedPath, walk_files};
use std::sync::Arc;

/// One loaded data source in the search path.
#[derive(Debug, Clone)]
pub struct Source {
    path: NormalizedPath,
    backend: String,
    data: Arc<Mapping>,
}

impl Source {
    pub fn new(path: NormalizedPath, backend: impl Into<String>, data: Arc<Mapping>) -> Self {
        Self {
            path,
            backend: backend.into(),
            data,
        }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Name of the backend that parsed this source.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn data(&self) -> &Mapping {
        &self.data
    }
}

/// Computes the precedence-ordered search path for a context.
#[derive(Debug)]
pub struct HierarchyResolver<'a> {
    config: &'a BaseConfig,
    base_dir: &'a NormalizedPath,
    cache: &'a SourceCache,
}

impl<'a> HierarchyResolver<'a> {
    pub fn new(config: &'a BaseConfig, base_dir: &'a NormalizedPath, cache: &'a SourceCache) -> Self {
        Self {
            config,
            base_dir,
            cache,
        }
    }

    /// Expand the hierarchy for `context`, loading every source found.
    ///
    /// A source that exists but fails to load aborts the expansion.
    pub fn resolve(&self, context: &Context) -> Result<Vec<Source>> {
        let mut sources = Vec::new();

        for declared in self.config.backends() {
            for level in self.config.hierarchy() {
                let Some(candidate) = self.candidate(declared, level, context) else {
                    continue;
                };

                if candidate.is_dir() {
                    self.expand_directory(&candidate, declared.backend().as_ref(), &mut sources)?;
                } else if let Some(file) = Self::existing_file(&candidate, declared.backend().as_ref()) {
                    sources.push(self.load(file, declared.backend().as_ref())?);
                } else {
                    tracing::trace!(path = %candidate, backend = declared.name(), "No data source");
                }
            }
        }

        Ok(sources)
    }

    fn candidate(
        &self,
        declared: &DeclaredBackend,
        level: &HierarchyLevel,
        context: &Context,
    ) -> Option<NormalizedPath> {
        let rendered = declared
            .datadir()
            .render(context)
            .and_then(|datadir| Ok((datadir, level.path().render(context)?)));

        match rendered {
            Ok((datadir, path)) => Some(self.base_dir.join(&datadir).join(&path)),
            Err(missing) => {
                tracing::trace!(
                    template = %missing.template,
                    variable = %missing.variable,
                    backend = declared.name(),
                    "Skipping hierarchy level"
                );
                None
            }
        }
    }

    fn existing_file(candidate: &NormalizedPath, backend: &dyn Backend) -> Option<NormalizedPath> {
        if candidate.is_file() {
            return Some(candidate.clone());
        }
        backend
            .extensions()
            .iter()
            .map(|ext| candidate.with_appended_extension(ext))
            .find(NormalizedPath::is_file)
    }

    /// Files of other backends are left to their own pass.
    fn expand_directory(
        &self,
        dir: &NormalizedPath,
        backend: &dyn Backend,
        sources: &mut Vec<Source>,
    ) -> Result<()> {
        for file in walk_files(dir)? {
            if file.extension().is_some_and(|ext| backend.claims(ext)) {
                sources.push(self.load(file, backend)?);
            }
        }
        Ok(())
    }

    fn load(&self, path: NormalizedPath, backend: &dyn Backend) -> Result<Source> {
        let data = self.cache.load(&path, backend, false)?;
        Ok(Source::new(path, backend.name(), data))
    }
}
