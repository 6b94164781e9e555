//! Utility functions for error handling
//!
//! This module provides utility functions to make error handling more convenient.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{IcuDbError, Result};

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
        return Err(IcuDbError::io_error(format!("File not found, needed for {purpose}")).with_path(path));
    }

    if !path.is_file() {
        return Err(
            IcuDbError::io_error(format!("Path is not a file, expected a file for {purpose}"))
                .with_path(path),
        );
    }

    match fs::File::open(path) {
        Ok(file) => Ok(file),
        Err(e) => {
            let context = match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    "Permission denied - check file permissions".to_string()
                }
                io::ErrorKind::NotFound => {
                    "File not found - it may have been deleted during operation".to_string()
                }
                _ => format!("Failed to open file for {purpose}"),
            };

            Err(IcuDbError::io_error_with_source(context, e).with_path(path))
        }
    }
}

/// Safely create (or truncate) a file with rich error information
pub fn safe_create_file(path: &Path, purpose: &str) -> Result<fs::File> {
    fs::File::create(path).map_err(|e| {
        IcuDbError::io_error_with_source(format!("Failed to create file for {purpose}"), e)
            .with_path(path)
    })
}

/// Check if a directory exists and is readable, with rich error information
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(
            IcuDbError::io_error(format!("Directory not found, needed for {purpose}")).with_path(path),
        );
    }

    if !path.is_dir() {
        return Err(IcuDbError::io_error(format!(
            "Path is not a directory, expected a directory for {purpose}"
        ))
        .with_path(path));
    }

    match fs::read_dir(path) {
        Ok(_) => Ok(()),
        Err(e) => {
            let context = match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    "Permission denied - check directory permissions".to_string()
                }
                _ => format!("Failed to read directory for {purpose}"),
            };
            Err(IcuDbError::io_error_with_source(context, e).with_path(path))
        }
    }
}

/// Create a directory (and its parents) if it does not exist yet
pub fn ensure_directory(path: &Path, purpose: &str) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        IcuDbError::io_error_with_source(format!("Failed to create directory for {purpose}"), e)
            .with_path(path)
    })
}
