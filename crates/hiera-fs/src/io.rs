//! Read operations for data sources

use crate::{Error, NormalizedPath, Result};
use std::fs;

/// Read a whole file as raw bytes; backends decide the encoding.
///
/// The error carries the native path.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    fs::read(&native_path).map_err(|e| Error::io(&native_path, e))
}
