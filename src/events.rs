//! Inbound event envelopes.
//!
//! The runtime delivers the standard `aws_lambda_events` shapes; this module
//! re-exports them and adds the few reads the pipeline needs on top: whether
//! a storage record is an object creation, and its bucket plus decoded key.

use crate::message::SourceObjectRef;
use std::borrow::Cow;

pub use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
pub use aws_lambda_events::event::sns::{SnsEvent, SnsMessage, SnsRecord};

/// Prefix shared by every object-created event name (`ObjectCreated:Put`, ...).
pub const OBJECT_CREATED_PREFIX: &str = "ObjectCreated:";

/// Pipeline reads over a storage notification record.
pub trait StorageRecordExt {
    /// True unless the record names an event other than object creation.
    fn is_object_created(&self) -> bool;

    /// Bucket and decoded key, or `None` if either is missing or empty.
    fn source(&self) -> Option<SourceObjectRef>;
}

impl StorageRecordExt for S3EventRecord {
    fn is_object_created(&self) -> bool {
        self.event_name
            .as_deref()
            .is_none_or(|name| name.starts_with(OBJECT_CREATED_PREFIX))
    }

    fn source(&self) -> Option<SourceObjectRef> {
        let bucket = self.s3.bucket.name.as_deref().unwrap_or_default();
        let key = decode_object_key(self.s3.object.key.as_deref().unwrap_or_default());
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(SourceObjectRef::new(bucket, key))
    }
}

/// Decode a storage-event object key: `+` is a space, `%XX` an escaped byte.
///
/// Keys that do not decode to valid UTF-8 are returned with only the `+`
/// substitution applied.
pub fn decode_object_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode(&spaced).map(Cow::into_owned);
    decoded.unwrap_or(spaced)
}
