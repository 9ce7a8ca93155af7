//! Pixel source adapter: the pipeline's only codec-facing seam.
//!
//! The orchestrator is backend-agnostic; anything that can turn bytes into
//! an RGBA buffer at a requested size (and back) can drive it. The default
//! implementation uses the `image` crate with Catmull-Rom resampling —
//! sharper than bilinear without the ringing Lanczos introduces around
//! high-contrast text edges.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use tracing::debug;

use crate::error::PreprocessError;

/// Decode/encode capability consumed by the pipeline.
pub trait PixelSource: Send + Sync {
    /// Decode source bytes into an RGBA buffer resampled to exactly
    /// `target_w` x `target_h`.
    fn decode(
        &self,
        bytes: &[u8],
        target_w: u32,
        target_h: u32,
    ) -> Result<RgbaImage, PreprocessError>;

    /// Decode as [`Self::decode`], then re-render rotated by `angle_deg`
    /// about the buffer center. The canvas keeps the target size, so
    /// content may clip at the corners; uncovered pixels are white.
    fn decode_rotated(
        &self,
        bytes: &[u8],
        target_w: u32,
        target_h: u32,
        angle_deg: f32,
    ) -> Result<RgbaImage, PreprocessError>;

    /// Serialize a pixel buffer to a lossless raster encoding (PNG).
    fn encode(&self, pixels: &RgbaImage) -> Result<Vec<u8>, PreprocessError>;
}

/// Default `image`-crate backed codec.
pub struct ImageCodec;

impl PixelSource for ImageCodec {
    fn decode(
        &self,
        bytes: &[u8],
        target_w: u32,
        target_h: u32,
    ) -> Result<RgbaImage, PreprocessError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| PreprocessError::Decode(e.to_string()))?;
        let rgba = img.to_rgba8();
        if rgba.dimensions() == (target_w, target_h) {
            return Ok(rgba);
        }
        debug!(
            from = format!("{}x{}", rgba.width(), rgba.height()),
            to = format!("{target_w}x{target_h}"),
            "Resampling decoded image"
        );
        Ok(image::imageops::resize(
            &rgba,
            target_w,
            target_h,
            FilterType::CatmullRom,
        ))
    }

    fn decode_rotated(
        &self,
        bytes: &[u8],
        target_w: u32,
        target_h: u32,
        angle_deg: f32,
    ) -> Result<RgbaImage, PreprocessError> {
        let upright = self.decode(bytes, target_w, target_h)?;
        Ok(rotate_about_center(&upright, angle_deg))
    }

    fn encode(&self, pixels: &RgbaImage) -> Result<Vec<u8>, PreprocessError> {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(pixels.clone())
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| PreprocessError::Encode(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// Re-render `src` rotated by `angle_deg` about its center onto a canvas of
/// the same size. Inverse-mapped bilinear sampling; destination pixels whose
/// source falls outside the buffer become white (document background).
pub fn rotate_about_center(src: &RgbaImage, angle_deg: f32) -> RgbaImage {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return src.clone();
    }
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let cx = (w as f32 - 1.0) / 2.0;
    let cy = (h as f32 - 1.0) / 2.0;

    let mut out = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            // inverse rotation back into source coordinates
            let sx = cos * dx + sin * dy + cx;
            let sy = -sin * dx + cos * dy + cy;
            if sx < 0.0 || sy < 0.0 || sx > (w - 1) as f32 || sy > (h - 1) as f32 {
                continue;
            }
            out.put_pixel(x, y, bilinear(src, sx, sy));
        }
    }
    out
}

fn bilinear(src: &RgbaImage, sx: f32, sy: f32) -> Rgba<u8> {
    let (w, h) = src.dimensions();
    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let p00 = src.get_pixel(x0, y0);
    let p10 = src.get_pixel(x1, y0);
    let p01 = src.get_pixel(x0, y1);
    let p11 = src.get_pixel(x1, y1);

    let mut blended = [0u8; 4];
    for c in 0..4 {
        let top = p00.0[c] as f32 * (1.0 - fx) + p10.0[c] as f32 * fx;
        let bottom = p01.0[c] as f32 * (1.0 - fx) + p11.0[c] as f32 * fx;
        blended[c] = (top * (1.0 - fy) + bottom * fy + 0.5)
            .floor()
            .clamp(0.0, 255.0) as u8;
    }
    Rgba(blended)
}
