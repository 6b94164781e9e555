//! Error handling for the ICU database loader.

pub mod util;

use std::io;
use std::path::PathBuf;

use crate::reader::Table;

/// Errors raised while building or restoring the ICU database.
///
/// Every structural violation aborts the load at the row that caused it.
/// Row-level failures are wrapped in [`IcuDbError::Row`] so the caller can see
/// which table and row to fix.
#[derive(Debug, thiserror::Error)]
pub enum IcuDbError {
    /// Error opening or reading a file
    #[error("IO error: {message}{}", path_suffix(.path))]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<io::Error>,
    },

    /// Malformed delimited input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Snapshot (de)serialization failure
    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot on disk is not one this version can read
    #[error("Unsupported snapshot: format '{format}' version {version}")]
    UnsupportedSnapshot { format: String, version: u32 },

    /// Worker pool for parallel event loading could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A required column is absent from the source row
    #[error("Missing field {field}")]
    MissingField { field: String },

    /// A closed-vocabulary field holds a value outside the vocabulary
    #[error("{field} invalid value '{value}'")]
    InvalidEnum { field: &'static str, value: String },

    /// A numeric field could not be parsed
    #[error("{field} is not a valid number: '{value}'")]
    InvalidNumber { field: String, value: String },

    /// A date-time string matched none of the accepted layouts
    #[error("Date parsing error: '{value}' matches neither %d/%m/%Y %H:%M:%S nor %Y-%m-%d %H:%M:%S")]
    DateParse { value: String },

    /// An identifier was inserted twice into the same scope
    #[error("{entity} {id} already exists{}", scope_suffix(.scope))]
    DuplicateKey {
        entity: &'static str,
        id: i64,
        scope: Option<String>,
    },

    /// A record points at a parent that was never loaded
    #[error("{entity} {id} does not exist{}", scope_suffix(.scope))]
    BrokenReference {
        entity: &'static str,
        id: i64,
        scope: Option<String>,
    },

    /// DOD, DOD_HOSP, DOD_SSN and EXPIRE_FLAG disagree
    #[error(
        "Inconsistent death record for patient {subject_id}: DOD='{dod}', DOD_HOSP='{dod_hosp}', DOD_SSN='{dod_ssn}', EXPIRE_FLAG='{expire_flag}'"
    )]
    DeathRecordMismatch {
        subject_id: i64,
        dod: String,
        dod_hosp: String,
        dod_ssn: String,
        expire_flag: String,
    },

    /// An event's VALUE is numeric but disagrees with its VALUENUM
    #[error("Item {item_id}: VALUE '{value}' does not match VALUENUM '{value_num}'")]
    ValueMismatch {
        item_id: i64,
        value: String,
        value_num: String,
    },

    /// Any of the above, raised while processing a specific source row
    #[error("{table} row {row}: {source}")]
    Row {
        table: Table,
        row: usize,
        #[source]
        source: Box<IcuDbError>,
    },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

fn scope_suffix(scope: &Option<String>) -> String {
    scope
        .as_ref()
        .map(|s| format!(" in {s}"))
        .unwrap_or_default()
}

impl IcuDbError {
    /// Create an IO error without an underlying source
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create an IO error that wraps an `io::Error`
    pub fn io_error_with_source(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            source: Some(source),
        }
    }

    /// Attach a path to an IO error; other kinds are returned unchanged
    #[must_use]
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Io {
                message, source, ..
            } => Self::Io {
                message,
                path: Some(path.into()),
                source,
            },
            other => other,
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wrap this error with the table and row it was raised for
    #[must_use]
    pub fn at_row(self, table: Table, row: usize) -> Self {
        Self::Row {
            table,
            row,
            source: Box::new(self),
        }
    }

    /// The underlying error kind, looking through row context
    #[must_use]
    pub fn kind_root(&self) -> &Self {
        match self {
            Self::Row { source, .. } => source.kind_root(),
            other => other,
        }
    }
}

impl From<io::Error> for IcuDbError {
    fn from(error: io::Error) -> Self {
        Self::io_error_with_source(error.to_string(), error)
    }
}

/// Result type for ICU database operations
pub type Result<T> = std::result::Result<T, IcuDbError>;
