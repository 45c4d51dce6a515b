//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the dimensions of an image scaled to fit inside a bounding box.
///
/// The result never exceeds `bounds` on either axis, keeps the source aspect
/// ratio, and is never larger than the source: an image that already fits is
/// returned unchanged.
///
/// The constrained edge is clamped to the box; the other edge is derived from
/// the aspect ratio and rounded to whichever neighbouring integer keeps the
/// ratio closest (floor wins ties), with a floor of 1px.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box (max width, max height)
///
/// # Examples
/// ```
/// # use bucket_thumbnails::imaging::calculate_fit_dimensions;
/// // 4:3 landscape into a 128px square → 128x96
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (128, 128)), (128, 96));
///
/// // Already fits → unchanged
/// assert_eq!(calculate_fit_dimensions((100, 50), (128, 128)), (100, 50));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return source;
    }

    let x = bounds.0.min(src_w);
    let y = bounds.1.min(src_h);
    if (x, y) == source {
        return source;
    }

    let aspect = src_w as f64 / src_h as f64;
    if x as f64 / y as f64 >= aspect {
        // Box is relatively wider: height is the constraint
        let w = round_aspect(y as f64 * aspect, |n| (aspect - n as f64 / y as f64).abs());
        (w, y)
    } else {
        // Box is relatively taller: width is the constraint
        let h = round_aspect(x as f64 / aspect, |n| {
            if n == 0 {
                0.0
            } else {
                (aspect - x as f64 / n as f64).abs()
            }
        });
        (x, h)
    }
}

/// Pick floor or ceil of `number`, whichever scores lower under `error`.
fn round_aspect(number: f64, error: impl Fn(u32) -> f64) -> u32 {
    let lo = number.floor() as u32;
    let hi = number.ceil() as u32;
    let best = if error(hi) < error(lo) { hi } else { lo };
    best.max(1)
}
