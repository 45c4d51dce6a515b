//! Shared test utilities for the pipeline test suite.
//!
//! Builds synthetic images in memory and `aws_lambda_events` payloads from
//! JSON shaped like what the runtime delivers, so component tests never need
//! fixture files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let jpeg = encode_test_image(400, 300, ImageFormat::Jpeg);
//! let event = s3_event(&[("uploads", "pics/vacation.jpg")]);
//! let delivery = sns_event(r#"{"Bucket":"uploads","Key":"pics/vacation.jpg"}"#);
//! ```

use crate::events::{S3Event, SnsEvent};
use image::{ImageFormat, ImageReader, Rgb, RgbImage};
use serde_json::{Value, json};
use std::io::Cursor;

// =========================================================================
// Images
// =========================================================================

/// Encode a `width`×`height` gradient in `format`.
pub fn encode_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap_or_else(|e| panic!("encode {format:?} test image: {e}"));
    bytes
}

/// Dimensions of an encoded PNG. Panics if `bytes` is not a PNG.
pub fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    let reader = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Png);
    reader.into_dimensions().expect("valid PNG")
}

// =========================================================================
// Storage events
// =========================================================================

/// One `ObjectCreated:Put` record. `key` is used verbatim, so pass it
/// already form-URL-encoded when testing decoding.
pub fn s3_record_json(bucket: &str, key: &str) -> Value {
    json!({
        "eventVersion": "2.1",
        "eventSource": "aws:s3",
        "awsRegion": "eu-west-1",
        "eventTime": "2024-05-04T12:00:00.000Z",
        "eventName": "ObjectCreated:Put",
        "userIdentity": { "principalId": "AWS:AIDAEXAMPLE" },
        "requestParameters": { "sourceIPAddress": "203.0.113.7" },
        "responseElements": {
            "x-amz-request-id": "C3D13FE58DE4C810",
            "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S/JRWeUWerMUE5JgHvANOjpD"
        },
        "s3": {
            "s3SchemaVersion": "1.0",
            "configurationId": "image-uploaded",
            "bucket": {
                "name": bucket,
                "ownerIdentity": { "principalId": "A3NL1KOZZKExample" },
                "arn": format!("arn:aws:s3:::{bucket}")
            },
            "object": {
                "key": key,
                "size": 1024,
                "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                "sequencer": "0055AED6DCD90281E5"
            }
        }
    })
}

/// A storage event with one record per `(bucket, key)`.
pub fn s3_event_json(objects: &[(&str, &str)]) -> Value {
    let records: Vec<Value> = objects
        .iter()
        .map(|(bucket, key)| s3_record_json(bucket, key))
        .collect();
    json!({ "Records": records })
}

pub fn s3_event(objects: &[(&str, &str)]) -> S3Event {
    serde_json::from_value(s3_event_json(objects)).expect("valid storage event")
}

// =========================================================================
// Bus deliveries
// =========================================================================

/// A one-record bus delivery carrying `message` verbatim.
pub fn sns_event_json(message: &str) -> Value {
    json!({
        "Records": [{
            "EventVersion": "1.0",
            "EventSubscriptionArn": "arn:aws:sns:eu-west-1:123456789012:image-uploaded:2bcfbf39-05c3-41de-beaa-fcfcc21c8f55",
            "EventSource": "aws:sns",
            "Sns": {
                "Type": "Notification",
                "MessageId": "95df01b4-ee98-5cb9-9903-4c221d41eb5e",
                "TopicArn": "arn:aws:sns:eu-west-1:123456789012:image-uploaded",
                "Subject": null,
                "Message": message,
                "Timestamp": "2024-05-04T12:00:01.000Z",
                "SignatureVersion": "1",
                "Signature": "EXAMPLEpH+DcEwjAPg8O9mY8dReBSwksfg2S7WKQcikcNKWLQjwu6A4VbeS0QHVCkhRS7fUQvi2egU3N858fiTDN6bkkOxYDVrY0Ad8L10Hs3zH81mtnPk5uvvolIC1CXGu43obcgFxeL3khZl8IKvO61GWB6jI9b5+gLPoBc1Q=",
                "SigningCertUrl": "https://sns.eu-west-1.amazonaws.com/SimpleNotificationService-0000000000000000000000.pem",
                "UnsubscribeUrl": "https://sns.eu-west-1.amazonaws.com/?Action=Unsubscribe&SubscriptionArn=arn:aws:sns:eu-west-1:123456789012:image-uploaded:2bcfbf39-05c3-41de-beaa-fcfcc21c8f55",
                "MessageAttributes": {}
            }
        }]
    })
}

pub fn sns_event(message: &str) -> SnsEvent {
    serde_json::from_value(sns_event_json(message)).expect("valid bus event")
}
