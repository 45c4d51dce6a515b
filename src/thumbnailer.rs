//! Thumbnailer: consumes topic messages and stores PNG thumbnails.
//!
//! One message in, at most one object out:
//!
//! ```text
//! {"Bucket","Key"} → get source → fit inside max box → PNG → put <prefix>/<name>.png
//! ```
//!
//! The destination key depends only on the source key and the configured
//! prefix, so a redelivered message overwrites the earlier thumbnail. Any
//! failure ends the invocation before the put; nothing partial is written.

use crate::config::{ConfigError, PipelineConfig};
use crate::error::PipelineError;
use crate::events::SnsEvent;
use crate::imaging::{DecodeLimits, ImageBackend, RustBackend, ThumbnailSpec, create_thumbnail};
use crate::message::{NotificationMessage, SourceObjectRef};
use crate::naming::{DestinationRef, normalize_prefix};
use crate::storage::{ObjectStore, ObjectUpload};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Content type of every stored thumbnail.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// User metadata key holding the hex SHA-256 of the source body.
pub const SOURCE_DIGEST_METADATA: &str = "source-sha256";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailerSettings {
    pub bucket: String,
    /// Normalized: trailing separators removed.
    pub prefix: String,
    pub spec: ThumbnailSpec,
    pub limits: DecodeLimits,
}

impl ThumbnailerSettings {
    /// Settings with the default 128×128 box and decode limits.
    pub fn new(bucket: impl Into<String>, prefix: &str) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: normalize_prefix(prefix).to_string(),
            spec: ThumbnailSpec::default(),
            limits: DecodeLimits::default(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            bucket: config.destination_bucket()?.to_string(),
            prefix: normalize_prefix(config.destination_prefix()?).to_string(),
            spec: config.thumbnail_spec()?,
            limits: config.decode_limits(),
        })
    }
}

/// A thumbnail that was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredThumbnail {
    pub source: SourceObjectRef,
    pub destination: DestinationRef,
    pub width: u32,
    pub height: u32,
    /// Encoded PNG size in bytes.
    pub size: usize,
    pub source_sha256: String,
}

impl StoredThumbnail {
    pub fn key(&self) -> String {
        self.destination.key()
    }
}

pub struct Thumbnailer<S, B = RustBackend> {
    store: S,
    backend: B,
    settings: ThumbnailerSettings,
}

impl<S: ObjectStore> Thumbnailer<S> {
    pub fn new(store: S, settings: ThumbnailerSettings) -> Self {
        Self::with_backend(store, RustBackend::new(), settings)
    }
}

impl<S: ObjectStore, B: ImageBackend> Thumbnailer<S, B> {
    pub fn with_backend(store: S, backend: B, settings: ThumbnailerSettings) -> Self {
        Self {
            store,
            backend,
            settings,
        }
    }

    pub fn settings(&self) -> &ThumbnailerSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process the first message of a bus delivery.
    pub async fn handle_event(&self, event: &SnsEvent) -> Result<StoredThumbnail, PipelineError> {
        let record = event.records.first().ok_or_else(|| {
            PipelineError::MalformedMessage("bus event has no records".into())
        })?;
        debug!(
            message_id = %record.sns.message_id,
            topic = %record.sns.topic_arn,
            "Handling message"
        );
        self.handle_message(&record.sns.message).await
    }

    /// Process one published payload end to end.
    pub async fn handle_message(&self, payload: &str) -> Result<StoredThumbnail, PipelineError> {
        let message = NotificationMessage::from_json(payload)?;
        let source = message.source();
        let destination =
            DestinationRef::derive(&self.settings.bucket, &self.settings.prefix, &source.key);

        let body = self
            .store
            .get_object(&source.bucket, &source.key)
            .await
            .map_err(|e| PipelineError::from_fetch(&source.bucket, &source.key, e))?;
        let source_sha256 = format!("{:x}", Sha256::digest(&body));
        debug!(%source, bytes = body.len(), "Fetched source");

        let thumbnail =
            create_thumbnail(&self.backend, &body, self.settings.spec, self.settings.limits)
                .map_err(|e| PipelineError::UnsupportedFormat {
                    bucket: source.bucket.clone(),
                    key: source.key.clone(),
                    source: e,
                })?;

        let key = destination.key();
        let size = thumbnail.bytes.len();
        let upload = ObjectUpload {
            body: thumbnail.bytes,
            content_type: PNG_CONTENT_TYPE,
            metadata: vec![(SOURCE_DIGEST_METADATA.to_string(), source_sha256.clone())],
        };
        self.store
            .put_object(&destination.bucket, &key, upload)
            .await
            .map_err(|e| PipelineError::DestinationWrite {
                bucket: destination.bucket.clone(),
                key: key.clone(),
                source: e,
            })?;

        Ok(StoredThumbnail {
            source,
            destination,
            width: thumbnail.width,
            height: thumbnail.height,
            size,
            source_sha256,
        })
    }
}
