//! Hierarchical configuration resolution
//!
//! Looks up keys across an ordered hierarchy of YAML and JSON data sources,
//! in the manner of Puppet's Hiera:
//!
//! - **Path templating**: hierarchy levels such as `%{environment}/%{name}`
//!   are rendered against a per-lookup context
//! - **Source cache**: each data file is parsed once per resolver and shared
//! - **Value resolution**: `%{hiera('key')}`, `%{scope('var')}`,
//!   `%{literal('x')}`, `%{alias('key')}` and `%{var}` interpolation,
//!   recursively through nested mappings and sequences
//! - **Merging**: list, set and dict accumulation across levels
//!
//! # Architecture
//!
//! ```text
//!              Resolver / ScopedResolver
//!                        |
//!     +-----------+------+------+-------------+
//!     |           |             |             |
//! BaseConfig  HierarchyResolver  ValueResolver  MergeAccumulator
//!     |           |
//! BackendRegistry SourceCache --- hiera-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hiera_core::{Context, LookupOptions, Resolver};
//!
//! let hiera = Resolver::open("hiera.yaml")?;
//! let node = hiera.scoped(Context::new().with("name", "web01"));
//! let port = node.get_with("http_port", &LookupOptions::new().with_default(8080))?;
//! # let _ = port;
//! # Ok::<(), hiera_core::Error>(())
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod hierarchy;
pub mod merge;
pub mod resolve;
pub mod resolver;
pub mod scoped;
pub mod template;

pub use backend::{Backend, BackendRegistry, JsonBackend, Mapping, YamlBackend};
pub use cache::SourceCache;
pub use config::{BaseConfig, ConfigVersion, DeclaredBackend, HierarchyLevel};
pub use context::Context;
pub use error::{Error, Result};
pub use hierarchy::{HierarchyResolver, Source};
pub use merge::{MergeAccumulator, MergePolicy, MergeStrategy};
pub use resolve::ValueResolver;
pub use resolver::{LookupOptions, Resolver, ResolverOptions};
pub use scoped::ScopedResolver;
pub use template::{MissingVariable, PathTemplate};
