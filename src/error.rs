//! Error types for the point-of-interest query engine.
//!
//! Failures are scoped by where they happen: [`LoadError`] at startup,
//! [`ParseError`] for a single malformed request, and [`ComputeFailure`] for a
//! clustering run. [`PoiError`] is what the public service API returns.

use poimap_types::ParseBoundsError;
use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, PoiError>;

/// The point data set could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed point record on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "snapshot")]
    #[error("corrupt snapshot: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("invalid data format: {0}")]
    InvalidFormat(String),

    #[error("unsupported data file {}: expected .jsonl, .ndjson, .json, .snap or .bin", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A request carried input that could not be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid bounds: {0}")]
    Bounds(#[from] ParseBoundsError),

    #[error("invalid zoom level '{value}'")]
    Zoom { value: String },
}

/// Clustering could not produce a result for the given input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputeFailure {
    #[error("point {index} ('{name}') has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize, name: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PoiError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("clustering failed: {0}")]
    Compute(#[from] ComputeFailure),

    #[error("service is not ready: {reason}")]
    Unready { reason: String },

    #[error("timed out after {waited:?} waiting for cluster computation")]
    ClusterTimeout { waited: Duration },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PoiError {
    /// True for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PoiError::Parse(_))
    }
}

impl From<ParseBoundsError> for PoiError {
    fn from(err: ParseBoundsError) -> Self {
        PoiError::Parse(ParseError::Bounds(err))
    }
}
