//! The resolver facade
//!
//! [`Resolver`] owns the parsed base configuration, the base directory the
//! data directories are relative to, the base context and the source cache.
//! Each lookup composes a context, expands the hierarchy for it and hands
//! the resulting search path to a [`ValueResolver`].
//!
//! # Example
//!
//! ```no_run
//! use hiera_core::{LookupOptions, MergePolicy, Resolver};
//!
//! let hiera = Resolver::open("/etc/puppetlabs/hiera.yaml")?;
//! let ntp = hiera.get("ntp_servers")?;
//! let users = hiera.get_with(
//!     "users",
//!     &LookupOptions::new().merge(MergePolicy::dict()).set("environment", "production"),
//! )?;
//! # let _ = (ntp, users);
//! # Ok::<(), hiera_core::Error>(())
//! ```

use crate::backend::BackendRegistry;
use crate::cache::SourceCache;
use crate::config::{BaseConfig, ConfigVersion, DeclaredBackend, HierarchyLevel};
use crate::context::Context;
use crate::hierarchy::{HierarchyResolver, Source};
use crate::merge::{MergeAccumulator, MergePolicy};
use crate::resolve::ValueResolver;
use crate::scoped::ScopedResolver;
use crate::{Error, Result};
use hiera_fs::NormalizedPath;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Construction options for a [`Resolver`].
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Force a base configuration layout instead of detecting it.
    pub version: Option<ConfigVersion>,
    /// Backends the base configuration may declare.
    pub backends: BackendRegistry,
    /// Context applied to every lookup.
    pub context: Context,
    /// Directory data directories are relative to.
    pub base_dir: Option<PathBuf>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            version: None,
            backends: BackendRegistry::with_builtins(),
            context: Context::new(),
            base_dir: None,
        }
    }
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: ConfigVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_backends(mut self, backends: BackendRegistry) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Add one variable to the base context.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(name, value);
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }
}

/// Per-call lookup options.
///
/// Context layers are applied as base, then [`context`](Self::context),
/// then the variables given with [`set`](Self::set); later wins.
#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    default: Option<Value>,
    merge: Option<MergePolicy>,
    throw_on_missing: bool,
    context: Context,
    overrides: Context,
}

impl LookupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value returned when the key is not found.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Accumulate the key across every level instead of stopping at the first.
    pub fn merge(mut self, policy: impl Into<MergePolicy>) -> Self {
        self.merge = Some(policy.into());
        self
    }

    /// Fail with [`Error::KeyNotFound`] instead of returning the default.
    pub fn throw_on_missing(mut self, throw: bool) -> Self {
        self.throw_on_missing = throw;
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Override one context variable for this call. `null` removes it.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(name, value);
        self
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn merge_policy(&self) -> Option<MergePolicy> {
        self.merge
    }

    pub fn throws_on_missing(&self) -> bool {
        self.throw_on_missing
    }

    /// The per-call context and overrides composed over `base`.
    pub(crate) fn compose(&self, base: &Context) -> Context {
        Context::compose(base, &self.context, &self.overrides)
    }
}

/// Hierarchical key lookup over a base configuration.
///
/// A `Resolver` is `Send + Sync`; share one behind an `Arc` to serve
/// concurrent lookups from a single cache.
#[derive(Debug)]
pub struct Resolver {
    config: BaseConfig,
    base_dir: NormalizedPath,
    context: Context,
    cache: SourceCache,
}

impl Resolver {
    /// Open the base configuration at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, ResolverOptions::default())
    }

    /// Open the base configuration at `path`.
    ///
    /// Data directories are relative to the configuration's directory unless
    /// `options.base_dir` is set.
    pub fn open_with(path: impl AsRef<Path>, options: ResolverOptions) -> Result<Self> {
        let path = NormalizedPath::new(path);
        let raw = hiera_fs::io::read_bytes(&path)?;
        let base_dir = match &options.base_dir {
            Some(dir) => NormalizedPath::new(dir),
            None => path.parent().unwrap_or_else(|| NormalizedPath::new(".")),
        };
        tracing::debug!(config = %path, base_dir = %base_dir, "Opening hiera configuration");
        Self::build(&raw, base_dir, options)
    }

    /// Read the base configuration from `reader`.
    ///
    /// Data directories are relative to `options.base_dir`, else the
    /// current directory.
    pub fn from_reader(mut reader: impl Read, options: ResolverOptions) -> Result<Self> {
        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .map_err(|e| Error::config(format!("Failed to read base hiera configuration: {}", e)))?;
        let base_dir = Self::detached_base_dir(&options)?;
        Self::build(&raw, base_dir, options)
    }

    /// Parse the base configuration from `text`. See [`Resolver::from_reader`].
    pub fn from_str(text: &str, options: ResolverOptions) -> Result<Self> {
        let base_dir = Self::detached_base_dir(&options)?;
        Self::build(text.as_bytes(), base_dir, options)
    }

    fn detached_base_dir(options: &ResolverOptions) -> Result<NormalizedPath> {
        match &options.base_dir {
            Some(dir) => Ok(NormalizedPath::new(dir)),
            None => std::env::current_dir()
                .map(NormalizedPath::new)
                .map_err(|e| Error::from(hiera_fs::Error::io(".", e))),
        }
    }

    fn build(raw: &[u8], base_dir: NormalizedPath, options: ResolverOptions) -> Result<Self> {
        let config = BaseConfig::parse(raw, options.version, &options.backends)?;
        let resolver = Self {
            config,
            base_dir,
            context: options.context,
            cache: SourceCache::new(),
        };

        // Warm the cache with everything reachable from the base context.
        let sources = resolver.search_paths(&Context::new())?;
        tracing::debug!(sources = sources.len(), "Resolver ready");

        Ok(resolver)
    }

    /// Look up `key` with default options.
    ///
    /// `Ok(None)` means the key was not found; a key holding `null` is
    /// `Ok(Some(Value::Null))`.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.get_with(key, &LookupOptions::default())
    }

    pub fn get_with(&self, key: &str, options: &LookupOptions) -> Result<Option<Value>> {
        self.lookup(key, &self.context, options)
    }

    /// Whether `key` is found under `context`.
    ///
    /// Only a missing key is swallowed; any other failure propagates.
    pub fn has(&self, key: &str, context: &Context) -> Result<bool> {
        self.has_in(key, &self.context, context)
    }

    /// A view whose lookups apply `context` on top of the base context.
    pub fn scoped(&self, context: Context) -> ScopedResolver<'_> {
        ScopedResolver::new(self, context)
    }

    /// Look up a dotted path: the first segment is a key, the rest index
    /// into nested mappings. Any missing step yields `Ok(None)`.
    pub fn get_nested(&self, path: &str) -> Result<Option<Value>> {
        self.nested_in(path, &self.context)
    }

    pub(crate) fn nested_in(&self, path: &str, scope: &Context) -> Result<Option<Value>> {
        let mut segments = path.split('.');
        let Some(key) = segments.next() else {
            return Ok(None);
        };
        let Some(mut value) = self.lookup(key, scope, &LookupOptions::default())? else {
            return Ok(None);
        };

        for segment in segments {
            value = match value {
                Value::Object(mut map) => match map.remove(segment) {
                    Some(inner) => inner,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            };
        }
        Ok(Some(value))
    }

    /// Search path for `context` composed over the base context.
    pub fn search_paths(&self, context: &Context) -> Result<Vec<Source>> {
        let composed = self.context.merged(context).without_falsy();
        self.sources(&composed)
    }

    /// Drop every cached source; the next lookup reads from disk.
    pub fn reload(&self) {
        tracing::debug!(entries = self.cache.len(), "Clearing source cache");
        self.cache.clear();
    }

    pub fn version(&self) -> ConfigVersion {
        self.config.version()
    }

    pub fn backends(&self) -> &[DeclaredBackend] {
        self.config.backends()
    }

    pub fn hierarchy(&self) -> &[HierarchyLevel] {
        self.config.hierarchy()
    }

    pub fn base_dir(&self) -> &NormalizedPath {
        &self.base_dir
    }

    /// The base context applied to every lookup.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    pub(crate) fn lookup(
        &self,
        key: &str,
        scope: &Context,
        options: &LookupOptions,
    ) -> Result<Option<Value>> {
        let context = options.compose(scope).without_falsy();
        let merge = options.merge.map(MergeAccumulator::new).transpose()?;
        let sources = self.sources(&context)?;

        tracing::debug!(key, sources = sources.len(), merge = ?options.merge, "Looking up key");

        match ValueResolver::new(&sources, &context).get_key(key, merge) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() && !options.throw_on_missing => {
                tracing::trace!(key, "Key not found, using default");
                Ok(options.default.clone())
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn has_in(&self, key: &str, scope: &Context, context: &Context) -> Result<bool> {
        let options = LookupOptions::new()
            .throw_on_missing(true)
            .context(context.clone());
        match self.lookup(key, scope, &options) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn sources(&self, context: &Context) -> Result<Vec<Source>> {
        HierarchyResolver::new(&self.config, &self.base_dir, &self.cache).resolve(context)
    }
}
