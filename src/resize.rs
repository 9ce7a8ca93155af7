//! Target-dimension planning.

use tracing::debug;

use crate::error::PreprocessError;
use crate::options::PreprocessOptions;

/// Upscale cap: small thumbnails gain nothing past 2x, interpolation just
/// smears the glyph edges the binarizers depend on.
const MAX_UPSCALE: f32 = 2.0;

/// Decide the decode target size from the declared source dimensions.
///
/// Sources below the configured minimums are upscaled by
/// `max(min_w/w, min_h/h, 1)` capped at [`MAX_UPSCALE`], rounded to the
/// nearest integer. Never downscales; sources already meeting the minimums
/// pass through unchanged. Zero dimensions fail before any decode work.
pub fn plan_dimensions(
    orig_width: u32,
    orig_height: u32,
    options: &PreprocessOptions,
) -> Result<(u32, u32), PreprocessError> {
    if orig_width == 0 || orig_height == 0 {
        return Err(PreprocessError::InvalidDimensions {
            width: orig_width,
            height: orig_height,
        });
    }

    if orig_width >= options.min_width && orig_height >= options.min_height {
        return Ok((orig_width, orig_height));
    }

    let scale = (options.min_width as f32 / orig_width as f32)
        .max(options.min_height as f32 / orig_height as f32)
        .max(1.0)
        .min(MAX_UPSCALE);
    let target_w = (orig_width as f32 * scale).round() as u32;
    let target_h = (orig_height as f32 * scale).round() as u32;
    debug!(
        from = format!("{orig_width}x{orig_height}"),
        to = format!("{target_w}x{target_h}"),
        scale,
        "Upscaling small source"
    );
    Ok((target_w, target_h))
}
