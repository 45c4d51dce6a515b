//! Destination key derivation for thumbnails.
//!
//! Every thumbnail lands at a key computed purely from the source key and the
//! configured prefix:
//!
//! ```text
//! source key            prefix          destination key
//! photos/img.jpg        thumbnails      thumbnails/img.png
//! a/b/c.tar.gz          thumbs/         thumbs/c.tar.png
//! a/b/noext             thumbnails      thumbnails/noext.png
//! ```
//!
//! The same source key always derives the same destination key, so a
//! redelivered message overwrites the earlier thumbnail instead of adding a
//! second one. Sources in different directories that share a base name map
//! to the same destination key; the last write wins.

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '/';

/// Extension of every stored thumbnail.
pub const THUMBNAIL_EXTENSION: &str = "png";

/// Final path segment of `key` with its last extension removed.
///
/// - `"photos/img.jpg"` → `"img"`
/// - `"a/b/c.tar.gz"` → `"c.tar"`
/// - `"a/b/noext"` → `"noext"`
/// - `".hidden"` → `".hidden"` (leading dots are part of the name, not an extension)
/// - `"trailing."` → `"trailing"`
pub fn derive_filename(key: &str) -> &str {
    let base = key.rsplit(KEY_SEPARATOR).next().unwrap_or(key);
    let name_start = base.len() - base.trim_start_matches('.').len();
    match base[name_start..].rfind('.') {
        Some(dot) => &base[..name_start + dot],
        None => base,
    }
}

/// Strip every trailing separator from a configured prefix.
pub fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_end_matches(KEY_SEPARATOR)
}

/// Where a thumbnail is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRef {
    pub bucket: String,
    /// Normalized: never ends with a separator.
    pub prefix: String,
    /// Base name of the source key, extension stripped.
    pub filename: String,
}

impl DestinationRef {
    pub fn derive(bucket: &str, prefix: &str, source_key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            prefix: normalize_prefix(prefix).to_string(),
            filename: derive_filename(source_key).to_string(),
        }
    }

    /// `prefix + "/" + filename + ".png"`.
    pub fn key(&self) -> String {
        format!(
            "{}{}{}.{}",
            self.prefix, KEY_SEPARATOR, self.filename, THUMBNAIL_EXTENSION
        )
    }
}

/// Destination key for `source_key` under `prefix`.
pub fn derive_destination_key(prefix: &str, source_key: &str) -> String {
    format!(
        "{}{}{}.{}",
        normalize_prefix(prefix),
        KEY_SEPARATOR,
        derive_filename(source_key),
        THUMBNAIL_EXTENSION
    )
}
