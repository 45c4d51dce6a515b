//! The message contract between the notifier and the thumbnailer.
//!
//! The topic is the only thing the two components share, and this JSON
//! object is the only thing that travels over it:
//!
//! ```json
//! {"Bucket":"uploads","Key":"pics/vacation.jpg"}
//! ```
//!
//! Whatever envelope the bus wraps around it is not part of the contract.

use crate::error::PipelineError;
use serde::Deserialize;
use std::fmt;

/// An object in the source bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceObjectRef {
    pub bucket: String,
    pub key: String,
}

impl SourceObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for SourceObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Payload published to the topic. Both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationMessage {
    #[serde(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Key")]
    pub key: String,
}

impl NotificationMessage {
    /// Parse and validate a payload received from the topic.
    pub fn from_json(payload: &str) -> Result<Self, PipelineError> {
        let message: Self = serde_json::from_str(payload)
            .map_err(|e| PipelineError::MalformedMessage(e.to_string()))?;
        message.validate()?;
        Ok(message)
    }

    /// Compact JSON with exactly the keys `Bucket` and `Key`.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "Bucket": self.bucket,
            "Key": self.key,
        })
        .to_string()
    }

    pub fn source(&self) -> SourceObjectRef {
        SourceObjectRef::new(&self.bucket, &self.key)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.bucket.is_empty() {
            return Err(PipelineError::MalformedMessage(
                "field `Bucket` is empty".into(),
            ));
        }
        if self.key.is_empty() {
            return Err(PipelineError::MalformedMessage("field `Key` is empty".into()));
        }
        Ok(())
    }
}

impl From<SourceObjectRef> for NotificationMessage {
    fn from(source: SourceObjectRef) -> Self {
        Self {
            bucket: source.bucket,
            key: source.key,
        }
    }
}
