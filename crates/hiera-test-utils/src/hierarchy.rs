//! [`TestHierarchy`] builder for resolver test scenarios.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name of the base configuration written by [`TestHierarchy`].
pub const CONFIG_FILE: &str = "hiera.yaml";

/// Data directory every backend points at.
pub const DATA_DIR: &str = "data";

/// A temporary directory holding a base configuration and its data files.
///
/// # Example
///
/// ```rust,no_run
/// use hiera_test_utils::TestHierarchy;
///
/// let hiera = TestHierarchy::v3(&["yaml"], &["%{name}", "common"]);
/// hiera.write_data("common.yaml", "greeting: hello\n");
/// hiera.assert_file_exists("data/common.yaml");
/// ```
pub struct TestHierarchy {
    temp_dir: TempDir,
}

impl Default for TestHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHierarchy {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A version 3 layout: every backend reads from `data/`.
    pub fn v3(backends: &[&str], hierarchy: &[&str]) -> Self {
        let mut config = format!(":backends: [{}]\n:hierarchy:\n", backends.join(", "));
        for level in hierarchy {
            config.push_str(&format!("  - '{}'\n", level));
        }
        for backend in backends {
            config.push_str(&format!(":{}:\n  :datadir: {}\n", backend, DATA_DIR));
        }

        let fixture = Self::new();
        fixture.write_config(&config);
        fixture
    }

    /// A version 5 layout with `defaults.datadir` set to `data/`.
    pub fn v5(hierarchy: &[&str]) -> Self {
        let mut config = format!("version: 5\ndefaults:\n  datadir: {}\nhierarchy:\n", DATA_DIR);
        for level in hierarchy {
            config.push_str(&format!("  - name: '{}'\n    path: '{}'\n", level, level));
        }

        let fixture = Self::new();
        fixture.write_config(&config);
        fixture
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join(CONFIG_FILE)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root().join(DATA_DIR)
    }

    /// Overwrite the base configuration.
    pub fn write_config(&self, content: &str) {
        self.write_file(CONFIG_FILE, content);
    }

    /// Write `content` to `path` relative to the root, creating parents.
    pub fn write_file(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {}", full_path.display(), e));
    }

    /// Write a data file relative to `data/`.
    pub fn write_data(&self, path: &str, content: &str) {
        self.write_file(&format!("{}/{}", DATA_DIR, path), content);
    }

    /// Write `value` as pretty JSON relative to `data/`.
    pub fn write_json(&self, path: &str, value: &Value) {
        let content = serde_json::to_string_pretty(value).unwrap();
        self.write_data(path, &content);
    }

    /// Create an empty directory relative to `data/`.
    pub fn create_data_dir(&self, path: &str) {
        fs::create_dir_all(self.data_dir().join(path)).unwrap();
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }
}
