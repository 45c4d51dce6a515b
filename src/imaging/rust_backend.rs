//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format sniffing | `image::ImageReader::with_guessed_format` (magic bytes, not the key's extension) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders), bounded by `image::Limits` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → PNG | `image::DynamicImage::write_to` into an in-memory buffer |

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
use super::params::{DecodeLimits, ThumbnailParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a reader over `source` with the format sniffed and limits applied.
fn open<'a>(
    source: &'a [u8],
    limits: &DecodeLimits,
) -> Result<ImageReader<Cursor<&'a [u8]>>, BackendError> {
    let mut reader = ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    if reader.format().is_none() {
        return Err(BackendError::UnknownFormat);
    }

    let mut decoder_limits = Limits::default();
    decoder_limits.max_alloc = Some(limits.max_alloc_bytes);
    reader.limits(decoder_limits);
    Ok(reader)
}

fn classify_decode_error(err: ImageError) -> BackendError {
    match err {
        ImageError::Limits(e) => BackendError::LimitsExceeded(e.to_string()),
        other => BackendError::Decode(other.to_string()),
    }
}

/// PNG holds 8/16-bit integer channels only; float images are narrowed to RGBA8.
fn png_compatible(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(img.to_rgba8())
        }
        other => other,
    }
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn identify(&self, source: &[u8], limits: &DecodeLimits) -> Result<Dimensions, BackendError> {
        let (width, height) = open(source, limits)?
            .into_dimensions()
            .map_err(classify_decode_error)?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(
        &self,
        source: &[u8],
        params: &ThumbnailParams,
    ) -> Result<EncodedImage, BackendError> {
        let img = open(source, &params.limits)?
            .decode()
            .map_err(classify_decode_error)?;

        let resized = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };

        let final_img = png_compatible(resized);
        let bytes = encode_png(&final_img)?;
        Ok(EncodedImage {
            bytes,
            width: final_img.width(),
            height: final_img.height(),
        })
    }
}
