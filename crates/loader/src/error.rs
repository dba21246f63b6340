use std::path::PathBuf;

use yamdb_core::error::ValidationError;
use yamdb_core::types::DbId;

/// Errors raised while reading, checking or storing an import, or while
/// creating a superuser.
///
/// Row-level variants carry the file name and the 1-based line so the
/// operator can fix the CSV and re-run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File {} not found", path.display())]
    MissingFile { path: PathBuf },

    #[error("Failed to read {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{file} is empty")]
    EmptyFile { file: &'static str },

    #[error("{file}: unknown column '{column}'")]
    UnknownColumn { file: &'static str, column: String },

    #[error("{file}: required column '{column}' is missing")]
    MissingColumn { file: &'static str, column: String },

    #[error("{file} line {line}: invalid {column} '{value}': {reason}")]
    InvalidValue {
        file: &'static str,
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("{file} line {line}: {column} {id} does not match any loaded row")]
    UnknownReference {
        file: &'static str,
        line: u64,
        column: String,
        id: DbId,
    },

    #[error("Invalid {field}: {reason}")]
    InvalidAccount { field: &'static str, reason: String },

    #[error("A user with that {field} already exists")]
    AccountTaken { field: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
