//! Filesystem primitives for the hiera resolver
//!
//! Provides normalized source paths (used as cache keys), file reads that
//! carry the offending path in their errors, and recursive directory walks.

pub mod error;
pub mod io;
pub mod path;
pub mod walk;

pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use walk::walk_files;
