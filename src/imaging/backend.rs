//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs:
//! identify (read dimensions from the header) and thumbnail (decode, resize
//! to an exact size, encode PNG). Both work on in-memory buffers; nothing
//! touches the filesystem.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and statically
//! linked.

use super::params::{DecodeLimits, ThumbnailParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unrecognized image format")]
    UnknownFormat,
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Decoder limits exceeded: {0}")]
    LimitsExceeded(String),
    #[error("PNG encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// An encoded PNG thumbnail held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Read image dimensions without decoding pixel data.
    fn identify(&self, source: &[u8], limits: &DecodeLimits) -> Result<Dimensions, BackendError>;

    /// Decode `source`, resize to exactly `params.width` × `params.height`,
    /// and encode the result as PNG.
    fn thumbnail(
        &self,
        source: &[u8],
        params: &ThumbnailParams,
    ) -> Result<EncodedImage, BackendError>;
}
