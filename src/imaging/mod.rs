//! Image processing in pure Rust, in memory.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` (header only) |
//! | **Fit** | [`calculate_fit_dimensions`]: bounding box, aspect kept, never upscaled |
//! | **Resize → PNG** | Lanczos3 + `image` PNG encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend
//!
//! Nothing in here logs or performs I/O; callers decide what to do with
//! the returned buffer.

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
pub use calculations::calculate_fit_dimensions;
pub use operations::{create_thumbnail, plan_thumbnail};
pub use params::{
    DEFAULT_MAX_DECODE_BYTES, DEFAULT_THUMBNAIL_EDGE, DecodeLimits, ThumbnailParams,
    ThumbnailSpec,
};
pub use rust_backend::RustBackend;
