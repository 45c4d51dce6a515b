//! Invocation-level error taxonomy.
//!
//! Every failure is terminal for the invocation that hit it. Nothing here is
//! retried in-process; the error is returned to the runtime, which owns
//! redelivery. [`PipelineError::kind`] collapses each variant onto one of the
//! six outcome codes reported in logs.

use crate::bus::PublishError;
use crate::imaging::BackendError;
use crate::message::SourceObjectRef;
use crate::storage::StorageError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),
    #[error("Source object s3://{bucket}/{key} not found")]
    SourceNotFound { bucket: String, key: String },
    #[error("Failed to fetch s3://{bucket}/{key}: {source}")]
    SourceFetch {
        bucket: String,
        key: String,
        source: StorageError,
    },
    #[error("s3://{bucket}/{key} is not a supported image: {source}")]
    UnsupportedFormat {
        bucket: String,
        key: String,
        source: BackendError,
    },
    #[error("Failed to write thumbnail s3://{bucket}/{key}: {source}")]
    DestinationWrite {
        bucket: String,
        key: String,
        source: StorageError,
    },
    #[error("Failed to publish to {topic}: {source}")]
    Publish { topic: String, source: PublishError },
    #[error("{} of {} records failed", .failures.len(), .failures.len() + .published)]
    PartialFailure {
        published: usize,
        failures: Vec<RecordFailure>,
    },
}

/// One record of a multi-record storage event that could not be relayed.
#[derive(Debug)]
pub struct RecordFailure {
    /// Position of the record in the event.
    pub index: usize,
    pub source: Option<SourceObjectRef>,
    pub error: PipelineError,
}

/// Outcome codes, one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedMessage,
    SourceNotFound,
    SourceFetchError,
    UnsupportedFormat,
    DestinationWriteError,
    InvocationFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedMessage => "MALFORMED_MESSAGE",
            Self::SourceNotFound => "SOURCE_NOT_FOUND",
            Self::SourceFetchError => "SOURCE_FETCH_ERROR",
            Self::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            Self::DestinationWriteError => "DESTINATION_WRITE_ERROR",
            Self::InvocationFailed => "INVOCATION_FAILED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedMessage(_) => ErrorKind::MalformedMessage,
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::SourceFetch { .. } => ErrorKind::SourceFetchError,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::DestinationWrite { .. } => ErrorKind::DestinationWriteError,
            Self::Publish { .. } | Self::PartialFailure { .. } => ErrorKind::InvocationFailed,
        }
    }

    /// Storage read failure, split into not-found and everything else.
    pub(crate) fn from_fetch(bucket: &str, key: &str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::SourceNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            other => Self::SourceFetch {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: other,
            },
        }
    }
}
