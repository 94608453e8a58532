//! Base configuration: declared backends and the hierarchy
//!
//! The base configuration (`hiera.yaml`) is the producer of the engine's
//! inputs. Two layouts are understood:
//!
//! - **Version 3**: `:backends`, `:hierarchy`, and per-backend settings under
//!   `:<backend>` (e.g. `:yaml: { :datadir: data }`).
//! - **Version 5**: `hierarchy` (strings or mappings with `path` / `name`),
//!   a single `yaml` backend, settings under `defaults`.
//!
//! # Example
//!
//! ```
//! use hiera_core::backend::BackendRegistry;
//! use hiera_core::config::{BaseConfig, ConfigVersion};
//!
//! let raw = b":backends: [yaml]\n:hierarchy: ['%{::name}', common]\n:yaml:\n  :datadir: data\n";
//! let config = BaseConfig::parse(raw, None, &BackendRegistry::with_builtins()).unwrap();
//! assert_eq!(config.version(), ConfigVersion::V3);
//! assert_eq!(config.hierarchy()[0].path().as_str(), "{name}");
//! ```

mod base;

pub use base::{BaseConfig, ConfigVersion, DEFAULT_DATADIR, DeclaredBackend, HierarchyLevel};
