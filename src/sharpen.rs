//! Unsharp-mask sharpening.

use image::{GrayImage, Luma};

/// Residual gain used by the pipeline's sharpen stage.
pub const DEFAULT_AMOUNT: f32 = 1.0;

/// Sharpen by amplifying the high-frequency residual against a 3x3 box
/// blur: `out = clamp(original + amount * (original - blurred))`.
/// Uniform regions have a zero residual and pass through unchanged.
pub fn unsharp_mask(gray: &GrayImage, amount: f32) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u32;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                    sum += gray.get_pixel(sx, sy).0[0] as u32;
                }
            }
            let blurred = sum as f32 / 9.0;
            let original = gray.get_pixel(x, y).0[0] as f32;
            let sharpened = original + amount * (original - blurred);
            out.put_pixel(x, y, Luma([(sharpened + 0.5).floor().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}
