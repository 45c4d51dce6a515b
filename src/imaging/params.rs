//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides the output size) and the [`backend`](super::backend)
//! (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`ThumbnailSpec`]: Process-wide bounding box (max width × max height), default 128×128.
//! - [`DecodeLimits`]: Allocation ceiling for the decoder.
//! - [`ThumbnailParams`]: Full specification for one thumbnail: exact output size plus limits.

use std::num::NonZeroU32;

/// Default bounding box edge, in pixels.
pub const DEFAULT_THUMBNAIL_EDGE: u32 = 128;

const DEFAULT_EDGE: NonZeroU32 = match NonZeroU32::new(DEFAULT_THUMBNAIL_EDGE) {
    Some(edge) => edge,
    None => panic!("DEFAULT_THUMBNAIL_EDGE must be non-zero"),
};

/// Default decoder allocation ceiling (512 MiB).
pub const DEFAULT_MAX_DECODE_BYTES: u64 = 512 * 1024 * 1024;

/// Bounding box every thumbnail must fit inside.
///
/// Fixed at startup and shared read-only by all invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSpec {
    max_width: NonZeroU32,
    max_height: NonZeroU32,
}

impl ThumbnailSpec {
    /// Returns `None` if either edge is zero.
    pub fn new(max_width: u32, max_height: u32) -> Option<Self> {
        Some(Self {
            max_width: NonZeroU32::new(max_width)?,
            max_height: NonZeroU32::new(max_height)?,
        })
    }

    pub fn max_width(self) -> u32 {
        self.max_width.get()
    }

    pub fn max_height(self) -> u32 {
        self.max_height.get()
    }

    pub fn bounds(self) -> (u32, u32) {
        (self.max_width(), self.max_height())
    }
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_EDGE,
            max_height: DEFAULT_EDGE,
        }
    }
}

/// Resource ceiling applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_alloc_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_alloc_bytes: DEFAULT_MAX_DECODE_BYTES,
        }
    }
}

/// Parameters for a single thumbnail operation (decode → resize → PNG).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailParams {
    /// Exact output dimensions, already fitted to the bounding box.
    pub width: u32,
    pub height: u32,
    pub limits: DecodeLimits,
}
