//! Shared test utilities for the hiera workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`hierarchy`]: [`TestHierarchy`] builder writing a base configuration
//!   and data files into a temporary directory
//! - [`fixtures`]: paths into the checked-in `test-fixtures/` tree

pub mod fixtures;
pub mod hierarchy;

pub use hierarchy::TestHierarchy;
