//! Paths into the checked-in `test-fixtures/` tree at the workspace root.

use std::path::PathBuf;

/// Root of `test-fixtures/`.
pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures")
}

/// Directory of the shared hierarchy fixture.
pub fn hierarchy_dir() -> PathBuf {
    fixtures_root().join("hierarchy")
}

/// A file inside the shared hierarchy fixture, e.g. `hiera.yaml`.
pub fn hierarchy_file(name: &str) -> PathBuf {
    hierarchy_dir().join(name)
}
