//! Notifier: relays storage "object created" events onto the topic.
//!
//! For each relayed record the notifier publishes exactly one
//! [`NotificationMessage`] carrying the bucket and the decoded key. It does
//! not read the object, so it stays cheap regardless of upload size.
//!
//! ## Batch policy
//!
//! Storage events may carry several records. By default only the first one
//! is relayed ([`RecordPolicy::FirstOnly`]). With [`RecordPolicy::All`] every
//! record is tried; if any of them fails, the invocation fails with
//! [`PipelineError::PartialFailure`] after the rest were published.
//!
//! ## Source filter
//!
//! Records are skipped (not published, not an error) when:
//! - the event name is present and is not `ObjectCreated:*`
//! - the key is a folder marker (ends with `/`)
//! - the key does not match the configured [`SourceFilter`]

use crate::bus::Publisher;
use crate::config::{ConfigError, PipelineConfig};
use crate::error::{PipelineError, RecordFailure};
use crate::events::{S3Event, S3EventRecord, StorageRecordExt};
use crate::message::{NotificationMessage, SourceObjectRef};
use crate::naming::KEY_SEPARATOR;
use std::fmt;
use tracing::{debug, info, warn};

/// Which records of a multi-record event are relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordPolicy {
    #[default]
    FirstOnly,
    All,
}

/// Key prefix / suffix filter applied to decoded keys.
///
/// An empty filter accepts every key. Matching is case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    prefix: Option<String>,
    suffixes: Vec<String>,
}

impl SourceFilter {
    /// Blank prefix and blank suffix entries are ignored.
    pub fn new(prefix: Option<String>, suffixes: Vec<String>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.trim().is_empty()),
            suffixes: suffixes
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn accepts(&self, key: &str) -> bool {
        let prefix_ok = self
            .prefix
            .as_deref()
            .is_none_or(|prefix| key.starts_with(prefix));
        let suffix_ok =
            self.suffixes.is_empty() || self.suffixes.iter().any(|s| key.ends_with(s.as_str()));
        prefix_ok && suffix_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierSettings {
    /// Topic every message is published to.
    pub topic: String,
    pub filter: SourceFilter,
    pub policy: RecordPolicy,
}

impl NotifierSettings {
    /// Settings with no filter and the first-record policy.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            filter: SourceFilter::default(),
            policy: RecordPolicy::FirstOnly,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let policy = if config.notifier.all_records {
            RecordPolicy::All
        } else {
            RecordPolicy::FirstOnly
        };
        Ok(Self {
            topic: config.topic_arn()?.to_string(),
            filter: SourceFilter::new(
                config.notifier.source_prefix.clone(),
                config.notifier.source_suffixes.clone(),
            ),
            policy,
        })
    }
}

/// Why a record was not published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotObjectCreated(String),
    FolderMarker,
    Filtered,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotObjectCreated(name) => write!(f, "event {name} is not an object creation"),
            Self::FolderMarker => f.write_str("key is a folder marker"),
            Self::Filtered => f.write_str("key does not match the source filter"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRecord {
    pub index: usize,
    pub source: SourceObjectRef,
    /// Id assigned by the bus.
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub index: usize,
    pub source: Option<SourceObjectRef>,
    pub reason: SkipReason,
}

/// What one successful invocation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub published: Vec<PublishedRecord>,
    pub skipped: Vec<SkippedRecord>,
}

enum Relayed {
    Published(PublishedRecord),
    Skipped(SkippedRecord),
}

impl NotifyReport {
    fn push(&mut self, relayed: Relayed) {
        match relayed {
            Relayed::Published(record) => self.published.push(record),
            Relayed::Skipped(record) => self.skipped.push(record),
        }
    }
}

pub struct Notifier<P> {
    publisher: P,
    settings: NotifierSettings,
}

impl<P: Publisher> Notifier<P> {
    pub fn new(publisher: P, settings: NotifierSettings) -> Self {
        Self {
            publisher,
            settings,
        }
    }

    pub fn settings(&self) -> &NotifierSettings {
        &self.settings
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Relay `event` according to the configured [`RecordPolicy`].
    ///
    /// An event with no records is malformed. Under the first-record policy
    /// the first failure is returned as-is.
    pub async fn notify(&self, event: &S3Event) -> Result<NotifyReport, PipelineError> {
        let Some(first) = event.records.first() else {
            return Err(PipelineError::MalformedMessage(
                "storage event has no records".into(),
            ));
        };

        let mut report = NotifyReport::default();
        match self.settings.policy {
            RecordPolicy::FirstOnly => {
                if event.records.len() > 1 {
                    debug!(
                        records = event.records.len(),
                        "Relaying first record only"
                    );
                }
                report.push(self.relay(0, first).await?);
            }
            RecordPolicy::All => {
                let mut failures = Vec::new();
                for (index, record) in event.records.iter().enumerate() {
                    match self.relay(index, record).await {
                        Ok(relayed) => report.push(relayed),
                        Err(error) => {
                            warn!(index, kind = %error.kind(), error = %error, "Record failed");
                            failures.push(RecordFailure {
                                index,
                                source: record.source(),
                                error,
                            });
                        }
                    }
                }
                if !failures.is_empty() {
                    return Err(PipelineError::PartialFailure {
                        published: report.published.len(),
                        failures,
                    });
                }
            }
        }
        Ok(report)
    }

    async fn relay(
        &self,
        index: usize,
        record: &S3EventRecord,
    ) -> Result<Relayed, PipelineError> {
        if !record.is_object_created() {
            let name = record.event_name.clone().unwrap_or_default();
            return Ok(self.skip(index, record.source(), SkipReason::NotObjectCreated(name)));
        }

        let source = record.source().ok_or_else(|| {
            PipelineError::MalformedMessage(format!("record {index} has no bucket name or key"))
        })?;

        if source.key.ends_with(KEY_SEPARATOR) {
            return Ok(self.skip(index, Some(source), SkipReason::FolderMarker));
        }
        if !self.settings.filter.accepts(&source.key) {
            return Ok(self.skip(index, Some(source), SkipReason::Filtered));
        }

        let payload = NotificationMessage::from(source.clone()).to_json();
        let message_id = self
            .publisher
            .publish(&self.settings.topic, &payload)
            .await
            .map_err(|err| PipelineError::Publish {
                topic: self.settings.topic.clone(),
                source: err,
            })?;

        debug!(index, %source, %message_id, "Published notification");
        Ok(Relayed::Published(PublishedRecord {
            index,
            source,
            message_id,
        }))
    }

    fn skip(&self, index: usize, source: Option<SourceObjectRef>, reason: SkipReason) -> Relayed {
        info!(
            index,
            key = source.as_ref().map(|s| s.key.as_str()),
            %reason,
            "Skipping record"
        );
        Relayed::Skipped(SkippedRecord {
            index,
            source,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::tests::RecordingPublisher;
    use crate::error::ErrorKind;
    use crate::test_helpers::{s3_event, s3_record_json};

    const TOPIC: &str = "arn:aws:sns:eu-west-1:123456789012:image-uploaded";

    fn notifier(settings: NotifierSettings) -> Notifier<RecordingPublisher> {
        Notifier::new(RecordingPublisher::new(), settings)
    }

    fn all_records() -> NotifierSettings {
        NotifierSettings {
            policy: RecordPolicy::All,
            ..NotifierSettings::new(TOPIC)
        }
    }

    // =========================================================================
    // Single record
    // =========================================================================

    #[tokio::test]
    async fn publishes_bucket_and_key() {
        let notifier = notifier(NotifierSettings::new(TOPIC));
        let report = notifier
            .notify(&s3_event(&[("uploads", "pics/vacation.jpg")]))
            .await
            .unwrap();

        assert_eq!(
            notifier.publisher().payloads(),
            vec![r#"{"Bucket":"uploads","Key":"pics/vacation.jpg"}"#]
        );
        assert_eq!(notifier.publisher().topics(), vec![TOPIC]);
        assert_eq!(report.published.len(), 1);
        assert_eq!(report.published[0].message_id, "msg-1");
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn publishes_decoded_key() {
        let notifier = notifier(NotifierSettings::new(TOPIC));
        notifier
            .notify(&s3_event(&[("uploads", "pics/my+summer%21.jpg")]))
            .await
            .unwrap();

        assert_eq!(
            notifier.publisher().payloads(),
            vec![r#"{"Bucket":"uploads","Key":"pics/my summer!.jpg"}"#]
        );
    }

    #[tokio::test]
    async fn empty_event_is_malformed() {
        let notifier = notifier(NotifierSettings::new(TOPIC));
        let err = notifier.notify(&s3_event(&[])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedMessage);
        assert!(notifier.publisher().payloads().is_empty());
    }

    #[tokio::test]
    async fn record_without_key_is_malformed() {
        let notifier = notifier(NotifierSettings::new(TOPIC));
        let err = notifier
            .notify(&s3_event(&[("uploads", "")]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedMessage);
    }

    #[tokio::test]
    async fn publish_failure_is_invocation_failure() {
        let notifier = Notifier::new(
            RecordingPublisher::rejecting("vacation"),
            NotifierSettings::new(TOPIC),
        );
        let err = notifier
            .notify(&s3_event(&[("uploads", "pics/vacation.jpg")]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvocationFailed);
        assert!(err.to_string().contains(TOPIC));
    }

    #[tokio::test]
    async fn first_only_ignores_later_records() {
        let notifier = notifier(NotifierSettings::new(TOPIC));
        let report = notifier
            .notify(&s3_event(&[("uploads", "a.jpg"), ("uploads", "b.jpg")]))
            .await
            .unwrap();

        assert_eq!(report.published.len(), 1);
        assert_eq!(
            notifier.publisher().payloads(),
            vec![r#"{"Bucket":"uploads","Key":"a.jpg"}"#]
        );
    }

    // =========================================================================
    // Skips
    // =========================================================================

    #[tokio::test]
    async fn removal_event_is_skipped() {
        let mut record = s3_record_json("uploads", "a.jpg");
        record["eventName"] = "ObjectRemoved:Delete".into();
        let event: S3Event =
            serde_json::from_value(serde_json::json!({ "Records": [record] })).unwrap();

        let notifier = notifier(NotifierSettings::new(TOPIC));
        let report = notifier.notify(&event).await.unwrap();

        assert!(report.published.is_empty());
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::NotObjectCreated("ObjectRemoved:Delete".into())
        );
        assert!(notifier.publisher().payloads().is_empty());
    }

    #[tokio::test]
    async fn folder_marker_is_skipped() {
        let notifier = notifier(NotifierSettings::new(TOPIC));
        let report = notifier
            .notify(&s3_event(&[("uploads", "pics/")]))
            .await
            .unwrap();
        assert_eq!(report.skipped[0].reason, SkipReason::FolderMarker);
        assert!(notifier.publisher().payloads().is_empty());
    }

    #[tokio::test]
    async fn filter_mismatch_is_skipped() {
        let settings = NotifierSettings {
            filter: SourceFilter::new(Some("images/".into()), vec![".jpg".into(), ".png".into()]),
            ..NotifierSettings::new(TOPIC)
        };
        let notifier = notifier(settings);

        let report = notifier
            .notify(&s3_event(&[("uploads", "docs/readme.txt")]))
            .await
            .unwrap();
        assert_eq!(report.skipped[0].reason, SkipReason::Filtered);

        let report = notifier
            .notify(&s3_event(&[("uploads", "images/cat.png")]))
            .await
            .unwrap();
        assert_eq!(report.published.len(), 1);
        assert_eq!(notifier.publisher().payloads().len(), 1);
    }

    // =========================================================================
    // All records
    // =========================================================================

    #[tokio::test]
    async fn all_records_publishes_each() {
        let notifier = notifier(all_records());
        let report = notifier
            .notify(&s3_event(&[
                ("uploads", "a.jpg"),
                ("uploads", "b.jpg"),
                ("other", "c.png"),
            ]))
            .await
            .unwrap();

        assert_eq!(report.published.len(), 3);
        assert_eq!(
            notifier.publisher().payloads(),
            vec![
                r#"{"Bucket":"uploads","Key":"a.jpg"}"#,
                r#"{"Bucket":"uploads","Key":"b.jpg"}"#,
                r#"{"Bucket":"other","Key":"c.png"}"#,
            ]
        );
    }

    #[tokio::test]
    async fn all_records_reports_failures_after_trying_the_rest() {
        let notifier = Notifier::new(RecordingPublisher::rejecting("b.jpg"), all_records());
        let err = notifier
            .notify(&s3_event(&[
                ("uploads", "a.jpg"),
                ("uploads", "b.jpg"),
                ("uploads", "c.jpg"),
            ]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvocationFailed);
        match err {
            PipelineError::PartialFailure {
                published,
                failures,
            } => {
                assert_eq!(published, 2);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].index, 1);
                assert_eq!(
                    failures[0].source,
                    Some(SourceObjectRef::new("uploads", "b.jpg"))
                );
            }
            other => panic!("expected partial failure, got {other:?}"),
        }
        assert_eq!(notifier.publisher().payloads().len(), 2);
    }

    // =========================================================================
    // Settings
    // =========================================================================

    #[test]
    fn empty_filter_accepts_everything() {
        let filter = SourceFilter::default();
        assert!(filter.accepts("anything/at/all.bin"));
    }

    #[test]
    fn blank_filter_entries_are_ignored() {
        let filter = SourceFilter::new(Some("  ".into()), vec![String::new(), " ".into()]);
        assert_eq!(filter, SourceFilter::default());
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        let filter = SourceFilter::new(None, vec![".jpg".into()]);
        assert!(filter.accepts("a/b.jpg"));
        assert!(!filter.accepts("a/b.JPG"));
    }

    #[test]
    fn settings_from_config() {
        let mut config = PipelineConfig::default();
        config.notifier.topic_arn = Some(TOPIC.into());
        config.notifier.source_prefix = Some("images/".into());
        config.notifier.all_records = true;

        let settings = NotifierSettings::from_config(&config).unwrap();
        assert_eq!(settings.topic, TOPIC);
        assert_eq!(settings.policy, RecordPolicy::All);
        assert!(settings.filter.accepts("images/x.jpg"));
        assert!(!settings.filter.accepts("docs/x.jpg"));
    }

    #[test]
    fn settings_require_topic() {
        let result = NotifierSettings::from_config(&PipelineConfig::default());
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }
}
