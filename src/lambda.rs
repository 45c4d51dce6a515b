//! Invocation boundary.
//!
//! Wires the components to the Lambda runtime: installs the JSON tracing
//! subscriber, builds AWS clients from the ambient credentials, and runs the
//! event loop. Each invocation gets a span carrying the runtime request id;
//! the outcome is logged once here, with the failure `kind` on error, and
//! the error is handed back to the runtime unchanged.

use crate::bus::{Publisher, SnsPublisher};
use crate::config::PipelineConfig;
use crate::events::{S3Event, SnsEvent};
use crate::imaging::ImageBackend;
use crate::notifier::{Notifier, NotifierSettings};
use crate::storage::{ObjectStore, S3ObjectStore};
use crate::thumbnailer::{Thumbnailer, ThumbnailerSettings};
use aws_config::BehaviorVersion;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// Install the global JSON subscriber filtered by `level`.
///
/// An unparsable directive falls back to `info`. Calling this twice is a
/// no-op.
pub fn init_tracing(level: &str) {
    let (filter, rejected) = match EnvFilter::try_new(level) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("info"), Some(e)),
    };

    let installed = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok();

    if let (true, Some(e)) = (installed, rejected) {
        warn!(level, error = %e, "Invalid log level, using info");
    }
}

/// Run the notifier loop until the runtime shuts the process down.
pub async fn run_notifier(config: &PipelineConfig) -> Result<(), Error> {
    let settings = NotifierSettings::from_config(config)?;
    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let notifier = Notifier::new(SnsPublisher::new(aws_sdk_sns::Client::new(&aws)), settings);
    info!(
        topic = %notifier.settings().topic,
        policy = ?notifier.settings().policy,
        "Notifier ready"
    );

    let notifier = &notifier;
    run(service_fn(move |event| handle_notify(notifier, event))).await
}

/// Run the thumbnailer loop until the runtime shuts the process down.
pub async fn run_thumbnailer(config: &PipelineConfig) -> Result<(), Error> {
    let settings = ThumbnailerSettings::from_config(config)?;
    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let thumbnailer = Thumbnailer::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&aws)), settings);
    info!(
        bucket = %thumbnailer.settings().bucket,
        prefix = %thumbnailer.settings().prefix,
        max_width = thumbnailer.settings().spec.max_width(),
        max_height = thumbnailer.settings().spec.max_height(),
        "Thumbnailer ready"
    );

    let thumbnailer = &thumbnailer;
    run(service_fn(move |event| handle_thumbnail(thumbnailer, event))).await
}

#[instrument(skip_all, fields(request_id = %event.context.request_id))]
async fn handle_notify<P: Publisher>(
    notifier: &Notifier<P>,
    event: LambdaEvent<S3Event>,
) -> Result<Value, Error> {
    match notifier.notify(&event.payload).await {
        Ok(report) => {
            for record in &report.published {
                info!(source = %record.source, message_id = %record.message_id, "Published");
            }
            Ok(json!({
                "published": report.published.len(),
                "skipped": report.skipped.len(),
            }))
        }
        Err(err) => {
            error!(kind = %err.kind(), error = %err, "Notification failed");
            Err(err.into())
        }
    }
}

#[instrument(skip_all, fields(request_id = %event.context.request_id))]
async fn handle_thumbnail<S: ObjectStore, B: ImageBackend>(
    thumbnailer: &Thumbnailer<S, B>,
    event: LambdaEvent<SnsEvent>,
) -> Result<Value, Error> {
    match thumbnailer.handle_event(&event.payload).await {
        Ok(stored) => {
            let key = stored.key();
            info!(
                source = %stored.source,
                bucket = %stored.destination.bucket,
                key = %key,
                width = stored.width,
                height = stored.height,
                bytes = stored.size,
                "Thumbnail stored"
            );
            Ok(json!({
                "bucket": stored.destination.bucket,
                "key": key,
                "width": stored.width,
                "height": stored.height,
            }))
        }
        Err(err) => {
            error!(kind = %err.kind(), error = %err, "Thumbnail failed");
            Err(err.into())
        }
    }
}
