//! Error types for decoding, fetching and loading archive files.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to decode a single fixed-width record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("record truncated: layout needs {required} characters, line has {actual}")]
    TruncatedRecord { required: usize, actual: usize },

    #[error("field `{field}` could not be decoded from {raw:?}: {reason}")]
    InvalidField {
        field: &'static str,
        raw: String,
        reason: String,
    },

    #[error("layout has no field named `{field}`")]
    UnknownField { field: &'static str },
}

impl RecordError {
    pub(crate) fn invalid(field: &'static str, raw: &str, reason: impl ToString) -> Self {
        RecordError::InvalidField {
            field,
            raw: raw.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Failure to decode a line-oriented input.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed line {line}: {content:?}")]
    MalformedLine {
        line: usize,
        content: String,
        #[source]
        error: RecordError,
    },

    #[error("I/O error while reading input")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// The 1-based line number, when the error refers to a line.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MalformedLine { line, .. } => Some(*line),
            ParseError::Io(_) => None,
        }
    }
}

/// Failure at the download boundary.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request for {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid station id {0:?}: expected 11 alphanumeric characters")]
    InvalidStationId(String),
}

/// Errors raised when loading whole files.
#[derive(Error, Debug)]
pub enum Error {
    #[error("fetch failed")]
    Fetch(#[from] FetchError),

    #[error("failed to parse {path}")]
    File {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("parse task for {path} did not complete: {message}")]
    Task { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
