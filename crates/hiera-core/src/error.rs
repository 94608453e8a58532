//! Error types for hiera-core

use std::path::PathBuf;

/// Result type for hiera-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or querying a resolver
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The base configuration is malformed
    #[error("Invalid base hiera configuration: {message}")]
    Config { message: String },

    /// The base configuration declares a backend nobody registered
    #[error("Invalid Backend: `{name}`")]
    UnknownBackend { name: String },

    /// The base configuration resolved to zero backends
    #[error("No backends could be loaded")]
    NoBackends,

    /// The base configuration has no hierarchy
    #[error("Invalid Base Hiera Config: missing hierarchy key")]
    MissingHierarchy,

    /// A data source exists but could not be read or parsed
    #[error("Failed to load file {path}: `{message}`")]
    Load { path: PathBuf, message: String },

    /// A backend rejected a document
    #[error("Failed to parse {backend} document: {message}")]
    Parse { backend: String, message: String },

    /// A function call produced nothing, or something that is not a string
    #[error("{reason} for function call: `{expression}`")]
    UnresolvableReference { expression: String, reason: String },

    /// Unknown function name, or an alias used inside a larger string
    #[error("{message}: `{expression}`")]
    InvalidFunctionCall { expression: String, message: String },

    /// No source contains the key
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    /// Deep merging was requested
    #[error("Deep merging isn't supported yet!")]
    DeepMergeUnsupported,

    /// A value found during a merge cannot be folded into the accumulator
    #[error("Cannot merge {found} value into a {strategy} merge for key {key}")]
    MergeTypeMismatch {
        key: String,
        strategy: String,
        found: String,
    },

    /// A key's resolution depends on itself
    #[error("Recursive lookup of `{key}` (chain: {chain})")]
    RecursiveLookup { key: String, chain: String },

    /// Filesystem error from hiera-fs
    #[error(transparent)]
    Fs(#[from] hiera_fs::Error),
}

impl Error {
    /// Whether this error only signals that a key is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn unresolvable(expression: &str, reason: impl Into<String>) -> Self {
        Self::UnresolvableReference {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_call(expression: &str, message: impl Into<String>) -> Self {
        Self::InvalidFunctionCall {
            expression: expression.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(key: &str) -> Self {
        Self::KeyNotFound {
            key: key.to_string(),
        }
    }
}
