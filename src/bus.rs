//! Pub/sub seam.
//!
//! [`Publisher`] sends one payload to one topic. [`SnsPublisher`] is the
//! production implementation on `aws-sdk-sns`. No retries happen here: a
//! failed publish is returned to the caller as-is.

use async_trait::async_trait;
use aws_sdk_sns::error::{DisplayErrorContext, SdkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Topic rejected the message: {0}")]
    Rejected(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `payload` to `topic`, returning the bus-assigned message id.
    async fn publish(&self, topic: &str, payload: &str) -> Result<String, PublishError>;
}

/// [`Publisher`] backed by Amazon SNS.
#[derive(Clone)]
pub struct SnsPublisher {
    client: aws_sdk_sns::Client,
}

impl SnsPublisher {
    pub fn new(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Publisher for SnsPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<String, PublishError> {
        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .message(payload)
            .send()
            .await
            .map_err(|err| {
                let detail = DisplayErrorContext(&err).to_string();
                match err {
                    SdkError::ServiceError(_) => PublishError::Rejected(detail),
                    _ => PublishError::Transport(detail),
                }
            })?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }
}
