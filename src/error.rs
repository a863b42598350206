//! Error types
//!
//! `DedupError` covers the fatal conditions of a run. `MalformedRecord` is the
//! per-line failure the driver recovers from by dropping the line.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = DedupError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum DedupError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while {action}: {source}")]
    Stream {
        action: &'static str,
        #[source]
        source: io::Error,
    },
}

impl DedupError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn stream(action: &'static str, source: io::Error) -> Self {
        Self::Stream { action, source }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("expected at least 11 tab-separated fields, found {0}")]
    TooFewFields(usize),

    #[error("invalid FLAG field: {0:?}")]
    InvalidFlag(String),

    #[error("invalid POS field: {0:?}")]
    InvalidPosition(String),

    #[error("record is not valid UTF-8")]
    InvalidUtf8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = DedupError::io(
            "/no/such/file.sam",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/no/such/file.sam"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_malformed_message() {
        assert_eq!(
            MalformedRecord::TooFewFields(3).to_string(),
            "expected at least 11 tab-separated fields, found 3"
        );
    }
}
