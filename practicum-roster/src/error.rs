//! Error types for practicum-roster.

use std::path::PathBuf;

use thiserror::Error;

use practicum_core::ParseValueError;

/// Errors that stop a roster from being read at all.
///
/// Problems with a single row are not errors; see [`crate::Rejection`].
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is missing required column(s): {}", columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("course '{0}' is not in the configured catalog")]
    UnknownCourse(String),

    #[error("cannot determine the course for {path}; pass --course or name the file like 2025_Summer_MSDS692.csv")]
    MissingCourse { path: PathBuf },

    #[error("cannot determine the semester for {path}; pass --semester or name the file like 2025_Summer_MSDS692.csv")]
    MissingSemester { path: PathBuf },

    #[error(transparent)]
    Value(#[from] ParseValueError),
}
