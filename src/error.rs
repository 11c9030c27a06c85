//! Error types for dataset loading, feature extraction and batch runs.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while locating or reading raw recordings.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Nothing to process under the dataset root.
    #[error("no *.{extension} input files found under {root:?} (searched {subdirs:?})")]
    NoInputFiles {
        root: PathBuf,
        subdirs: Vec<String>,
        extension: String,
    },

    /// The file name does not carry a subject id.
    #[error("no subject id in file name {path:?} (pattern `{pattern}`)")]
    SubjectIdNotFound { path: PathBuf, pattern: String },

    /// The subject id pattern is unusable.
    #[error("invalid subject id pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Filesystem failure.
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited parser failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A line with the wrong number of columns.
    #[error("line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A field that does not parse as a number.
    #[error("line {line}: invalid value `{value}` in column {column}")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },

    /// A parse failure inside a recording, tagged with the file.
    #[error("{path:?}: {error}")]
    InFile {
        path: PathBuf,
        error: Box<DatasetError>,
    },

    /// A subject table file that is not valid JSON for the table shape.
    #[error("subject table {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DatasetError {
    /// Create an IO error tagged with the offending path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Attach the recording path to a parse error.
    #[must_use]
    pub fn in_file(path: impl AsRef<Path>, error: DatasetError) -> Self {
        Self::InFile {
            path: path.as_ref().to_path_buf(),
            error: Box::new(error),
        }
    }

    /// Create an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by the per-file extraction routine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The subject id derived from a file is not in the metadata table.
    #[error("subject {0} is not in the subject metadata table")]
    UnknownSubject(u32),
}

/// Umbrella error for a batch run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Failure while writing an output file.
    #[error("failed to write {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failure while finalizing an output file.
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest serialization failure.
    #[error("failed to serialize run manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// A worker thread died before reporting its result.
    #[error("worker thread terminated before finishing file {0:?}")]
    WorkerLost(PathBuf),
}

/// Result type alias for batch operations.
pub type Result<T> = std::result::Result<T, Error>;
