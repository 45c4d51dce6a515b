//! Pipeline configuration module.
//!
//! Configuration is read once at process start and handed to each component
//! as an immutable value. Sources are layered, highest priority first:
//!
//! 1. Environment variables (the names the deployment sets, e.g. `SNS_TOPIC_ARN`)
//! 2. An optional TOML file passed with `--config`
//! 3. Built-in defaults
//!
//! ## Configuration Options
//!
//! ```toml
//! [notifier]
//! topic_arn = "arn:aws:sns:eu-west-1:123456789012:image-uploaded"  # SNS_TOPIC_ARN
//! source_prefix = "images/"         # SOURCE_KEY_PREFIX (omit to accept every key)
//! source_suffixes = [".jpg", ".png"] # SOURCE_KEY_SUFFIXES, comma separated
//! all_records = false               # NOTIFY_ALL_RECORDS
//!
//! [thumbnails]
//! max_width = 128                   # THUMBNAIL_WIDTH
//! max_height = 128                  # THUMBNAIL_HEIGHT
//! bucket = "thumbnails-bucket"      # THUMBNAIL_BUCKET
//! prefix = "thumbnails/"            # THUMBNAIL_PREFIX (trailing "/" stripped)
//! max_decode_bytes = 536870912      # THUMBNAIL_MAX_DECODE_BYTES
//!
//! [logging]
//! level = "info"                    # LOG_LEVEL
//! ```
//!
//! Keys that only one component needs are optional here and checked when
//! that component's settings are built, so the notifier does not need
//! thumbnail settings and vice versa.

use crate::imaging::{DEFAULT_MAX_DECODE_BYTES, DecodeLimits, ThumbnailSpec};
use confique::Config;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config load error: {0}")]
    Load(#[from] confique::Error),
    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Missing required setting `{key}` (env {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Process-wide configuration.
#[derive(Config, Debug, Clone)]
pub struct PipelineConfig {
    /// Storage-event relay settings.
    #[config(nested)]
    pub notifier: NotifierConfig,
    /// Thumbnail generation and destination settings.
    #[config(nested)]
    pub thumbnails: ThumbnailsConfig,
    #[config(nested)]
    pub logging: LoggingConfig,
}

#[derive(Config, Debug, Clone)]
pub struct NotifierConfig {
    /// Topic that receives one message per created object. Required by the notifier.
    #[config(env = "SNS_TOPIC_ARN")]
    pub topic_arn: Option<String>,
    /// Only keys starting with this prefix are relayed.
    #[config(env = "SOURCE_KEY_PREFIX")]
    pub source_prefix: Option<String>,
    /// Only keys ending with one of these suffixes are relayed. Empty accepts all.
    #[config(
        env = "SOURCE_KEY_SUFFIXES",
        parse_env = confique::env::parse::list_by_comma,
        default = []
    )]
    pub source_suffixes: Vec<String>,
    /// Relay every record of a batched event instead of only the first.
    #[config(env = "NOTIFY_ALL_RECORDS", default = false)]
    pub all_records: bool,
}

#[derive(Config, Debug, Clone)]
pub struct ThumbnailsConfig {
    /// Bounding box width in pixels.
    #[config(env = "THUMBNAIL_WIDTH", default = 128)]
    pub max_width: u32,
    /// Bounding box height in pixels.
    #[config(env = "THUMBNAIL_HEIGHT", default = 128)]
    pub max_height: u32,
    /// Destination bucket. Required by the thumbnailer.
    #[config(env = "THUMBNAIL_BUCKET")]
    pub bucket: Option<String>,
    /// Destination key prefix; trailing separators are stripped. Required by the thumbnailer.
    #[config(env = "THUMBNAIL_PREFIX")]
    pub prefix: Option<String>,
    /// Upper bound on decoder allocations, in bytes.
    #[config(env = "THUMBNAIL_MAX_DECODE_BYTES", default = 536870912)]
    pub max_decode_bytes: u64,
}

#[derive(Config, Debug, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `bucket_thumbnails=debug`.
    #[config(env = "LOG_LEVEL", default = "info")]
    pub level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            notifier: NotifierConfig {
                topic_arn: None,
                source_prefix: None,
                source_suffixes: Vec::new(),
                all_records: false,
            },
            thumbnails: ThumbnailsConfig {
                max_width: crate::imaging::DEFAULT_THUMBNAIL_EDGE,
                max_height: crate::imaging::DEFAULT_THUMBNAIL_EDGE,
                bucket: None,
                prefix: None,
                max_decode_bytes: DEFAULT_MAX_DECODE_BYTES,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl PipelineConfig {
    /// Load from the environment, layered over `file` (if given), layered over defaults.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            builder = builder.file(path);
        }
        let config = builder.load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.max_width == 0 || self.thumbnails.max_height == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_width and thumbnails.max_height must be non-zero".into(),
            ));
        }
        if self.thumbnails.max_decode_bytes == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_decode_bytes must be non-zero".into(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging.level must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Topic ARN, required and non-empty.
    pub fn topic_arn(&self) -> Result<&str, ConfigError> {
        required(
            self.notifier.topic_arn.as_deref(),
            "notifier.topic_arn",
            "SNS_TOPIC_ARN",
        )
    }

    /// Destination bucket, required and non-empty.
    pub fn destination_bucket(&self) -> Result<&str, ConfigError> {
        required(
            self.thumbnails.bucket.as_deref(),
            "thumbnails.bucket",
            "THUMBNAIL_BUCKET",
        )
    }

    /// Destination prefix, required but may be empty.
    pub fn destination_prefix(&self) -> Result<&str, ConfigError> {
        self.thumbnails
            .prefix
            .as_deref()
            .ok_or(ConfigError::Missing {
                key: "thumbnails.prefix",
                env: "THUMBNAIL_PREFIX",
            })
    }

    pub fn thumbnail_spec(&self) -> Result<ThumbnailSpec, ConfigError> {
        ThumbnailSpec::new(self.thumbnails.max_width, self.thumbnails.max_height).ok_or_else(
            || {
                ConfigError::Validation(
                    "thumbnails.max_width and thumbnails.max_height must be non-zero".into(),
                )
            },
        )
    }

    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_alloc_bytes: self.thumbnails.max_decode_bytes,
        }
    }
}

fn required<'a>(
    value: Option<&'a str>,
    key: &'static str,
    env: &'static str,
) -> Result<&'a str, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing { key, env }),
    }
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> String {
    confique::toml::template::<PipelineConfig>(confique::toml::FormatOptions::default())
}
