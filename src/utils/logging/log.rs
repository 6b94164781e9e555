//! Logging utilities
//!
//! This module provides standardized logging functions for table loading.

use std::path::Path;

use crate::reader::Table;

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file or directory being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `table` - Table that was processed
/// * `rows` - Number of source rows read
/// * `saved` - Number of records kept in the database
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    table: Table,
    rows: usize,
    saved: usize,
    elapsed: Option<std::time::Duration>,
) {
    if let Some(duration) = elapsed {
        log::info!(
            "DONE {} {} rows from {}.csv, total of {} records are saved in the database ({:?})",
            operation,
            rows,
            table,
            saved,
            duration
        );
    } else {
        log::info!(
            "DONE {} {} rows from {}.csv, total of {} records are saved in the database",
            operation,
            rows,
            table,
            saved
        );
    }
}

/// Log a periodic progress line for a table
pub fn log_progress(table: Table, row: usize, saved: usize) {
    log::info!("Successfully read {row} rows from {table}.csv ({saved} saved)");
}

/// Log an operation warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `path` - Optional path related to the warning
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}
