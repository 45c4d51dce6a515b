//! Object storage seam.
//!
//! The pipeline needs two calls, read a whole object and write a whole object,
//! behind the [`ObjectStore`] trait. [`S3ObjectStore`] is the production
//! implementation on `aws-sdk-s3`; tests use an in-memory store.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A whole object to be written in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUpload {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    /// User metadata stored alongside the object.
    pub metadata: Vec<(String, String)>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the full body of `bucket/key`.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Create or replace `bucket/key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        upload: ObjectUpload,
    ) -> Result<(), StorageError>;
}

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

fn status_error(status: u16, bucket: &str, key: &str, detail: String) -> StorageError {
    match status {
        404 => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        401 | 403 => StorageError::AccessDenied(detail),
        _ => StorageError::Transport(detail),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let detail = DisplayErrorContext(&err).to_string();
                match &err {
                    SdkError::ServiceError(service) if service.err().is_no_such_key() => {
                        StorageError::NotFound {
                            bucket: bucket.to_string(),
                            key: key.to_string(),
                        }
                    }
                    SdkError::ServiceError(service) => {
                        status_error(service.raw().status().as_u16(), bucket, key, detail)
                    }
                    _ => StorageError::Transport(detail),
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        upload: ObjectUpload,
    ) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(upload.content_type)
            .body(ByteStream::from(upload.body));
        for (name, value) in upload.metadata {
            request = request.metadata(name, value);
        }

        request.send().await.map_err(|err| {
            let detail = DisplayErrorContext(&err).to_string();
            match &err {
                SdkError::ServiceError(service) => {
                    status_error(service.raw().status().as_u16(), bucket, key, detail)
                }
                _ => StorageError::Transport(detail),
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store that records every call.
    #[derive(Default)]
    pub struct MemoryStore {
        pub objects: Mutex<HashMap<(String, String), ObjectUpload>>,
        pub operations: Mutex<Vec<StoreOp>>,
        /// Puts fail with access denied.
        pub fail_puts: bool,
        /// Gets fail with a transport error.
        pub fail_gets: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum StoreOp {
        Get { bucket: String, key: String },
        Put { bucket: String, key: String },
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_object(self, bucket: &str, key: &str, body: Vec<u8>) -> Self {
            self.objects.lock().unwrap().insert(
                (bucket.to_string(), key.to_string()),
                ObjectUpload {
                    body,
                    content_type: "application/octet-stream",
                    metadata: Vec::new(),
                },
            );
            self
        }

        pub fn object(&self, bucket: &str, key: &str) -> Option<ObjectUpload> {
            self.objects
                .lock()
                .unwrap()
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
        }

        pub fn object_count(&self) -> usize {
            self.objects.lock().unwrap().len()
        }

        pub fn get_operations(&self) -> Vec<StoreOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn puts(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, StoreOp::Put { .. }))
                .count()
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
            self.operations.lock().unwrap().push(StoreOp::Get {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
            if self.fail_gets {
                return Err(StorageError::Transport("simulated outage".into()));
            }
            self.object(bucket, key)
                .map(|o| o.body)
                .ok_or_else(|| StorageError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
        }

        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            upload: ObjectUpload,
        ) -> Result<(), StorageError> {
            self.operations.lock().unwrap().push(StoreOp::Put {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
            if self.fail_puts {
                return Err(StorageError::AccessDenied("simulated deny".into()));
            }
            self.objects
                .lock()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), upload);
            Ok(())
        }
    }

    #[test]
    fn status_codes_classify() {
        assert!(matches!(
            status_error(404, "b", "k", String::new()),
            StorageError::NotFound { .. }
        ));
        assert!(matches!(
            status_error(403, "b", "k", String::new()),
            StorageError::AccessDenied(_)
        ));
        assert!(matches!(
            status_error(503, "b", "k", "slow down".into()),
            StorageError::Transport(d) if d == "slow down"
        ));
    }

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        store
            .put_object(
                "b",
                "k",
                ObjectUpload {
                    body: vec![1, 2, 3],
                    content_type: "image/png",
                    metadata: Vec::new(),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.get_object("b", "k").await.unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            store.get_object("b", "missing").await,
            Err(StorageError::NotFound { .. })
        ));
        assert_eq!(store.get_operations().len(), 3);
    }
}
