//! Error types for practicum-core.

use std::path::PathBuf;

use thiserror::Error;

/// A scalar value (term, semester) that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    #[error("unknown term '{0}'; expected spring, summer, fall or winter")]
    Term(String),

    #[error("cannot parse semester '{0}'; expected e.g. 'Summer 2025'")]
    Semester(String),
}

/// Errors raised while loading `practicum.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML serialization error (writing the default config).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Two catalog entries share a code or a sequence number.
    #[error("invalid course catalog: {0}")]
    Catalog(String),
}

/// Reasons a `profile.md` cannot be understood.
///
/// Any of these turns a sync into a conflict: the file is left untouched.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document does not start with a '---' front-matter block")]
    MissingFrontMatter,

    #[error("front-matter block is never closed with '---'")]
    UnterminatedFrontMatter,

    #[error("front matter is not valid YAML: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("more than one practicum section for course {0}")]
    DuplicatePracticum(String),
}

/// All errors that can arise from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored document exists but could not be parsed.
    #[error("failed to parse document at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
