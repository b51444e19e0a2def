//! Utility functions for error handling
//!
//! This module provides utility functions to make error handling more convenient.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{DashboardError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
///
/// # Returns
/// * `Result<fs::File>` - The opened file or a detailed error
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(DashboardError::io_message(
            path,
            format!("File not found (needed for: {purpose})"),
        ));
    }

    if !path.is_file() {
        return Err(DashboardError::io_message(
            path,
            format!("Path is not a file (expected a file for: {purpose})"),
        ));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check file permissions".to_string()
            }
            _ => format!("Failed to open file for: {purpose}"),
        };
        DashboardError::io(path, io::Error::new(e.kind(), format!("{context}: {e}")))
    })
}

/// Safely read a file to string with rich error information
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;

    let mut content = String::new();
    match io::Read::read_to_string(&mut file, &mut content) {
        Ok(_) => Ok(content),
        Err(e) => {
            let context = match e.kind() {
                io::ErrorKind::InvalidData => {
                    "File contains invalid UTF-8 data - cannot read as text".to_string()
                }
                _ => format!("Failed to read file content for: {purpose}"),
            };
            Err(DashboardError::io(
                path,
                io::Error::new(e.kind(), format!("{context}: {e}")),
            ))
        }
    }
}

/// Try multiple labelled operations in sequence, returning the first success
///
/// If all operations fail, the returned [`DashboardError::Load`] lists one
/// line per attempt, in order.
///
/// # Arguments
/// * `path` - The file the operations are reading
/// * `operations` - `(label, operation)` pairs, tried front to back
pub fn try_operations<T, F>(path: &Path, operations: Vec<(&str, F)>) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let mut attempts = Vec::with_capacity(operations.len());

    for (i, (label, operation)) in operations.into_iter().enumerate() {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                log::debug!("Attempt {} ({label}) failed for {}: {e}", i + 1, path.display());
                attempts.push(format!("Attempt {} ({label}): {e}", i + 1));
            }
        }
    }

    Err(DashboardError::Load {
        path: path.to_path_buf(),
        attempts,
    })
}
