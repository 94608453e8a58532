//! Recursive directory traversal for directory-valued hierarchy levels

use crate::{Error, NormalizedPath, Result};
use walkdir::WalkDir;

/// Collect every regular file below `root`, recursively.
///
/// Entries are visited in file-name order within each directory so the
/// result is stable across platforms. The root itself is never returned.
/// Symbolic links are followed, matching how a plain file candidate is
/// opened.
pub fn walk_files(root: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
    let native_root = root.to_native();
    let mut files = Vec::new();

    let walker = WalkDir::new(&native_root)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| Error::Walk {
            path: e
                .path()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| native_root.clone()),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() {
            files.push(NormalizedPath::new(entry.path()));
        }
    }

    tracing::trace!(root = %root, count = files.len(), "Walked directory");
    Ok(files)
}
