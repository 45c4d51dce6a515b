//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::{DecodeLimits, ThumbnailParams, ThumbnailSpec};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Plan a thumbnail operation without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_thumbnail(
    source: Dimensions,
    spec: ThumbnailSpec,
    limits: DecodeLimits,
) -> ThumbnailParams {
    let (width, height) = calculate_fit_dimensions((source.width, source.height), spec.bounds());
    ThumbnailParams {
        width,
        height,
        limits,
    }
}

/// Create a PNG thumbnail that fits inside `spec`.
///
/// Reads the source dimensions from the header first so the output size is
/// known before any pixels are decoded.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &[u8],
    spec: ThumbnailSpec,
    limits: DecodeLimits,
) -> Result<EncodedImage> {
    let dims = backend.identify(source, &limits)?;
    let params = plan_thumbnail(dims, spec, limits);
    backend.thumbnail(source, &params)
}
