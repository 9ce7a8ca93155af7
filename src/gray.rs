//! RGBA to single-channel luminance reduction.

use image::{GrayImage, Luma, Rgba, RgbaImage};

/// Convert an RGBA buffer to grayscale using ITU-R BT.601 luminance.
///
/// `luma = round(0.299 R + 0.587 G + 0.114 B)` with round-half-up integer
/// rounding; alpha is ignored. Pure function — always allocates a new buffer.
pub fn grayscale(pixels: &RgbaImage) -> GrayImage {
    let (w, h) = pixels.dimensions();
    let mut gray = GrayImage::new(w, h);
    for (x, y, p) in pixels.enumerate_pixels() {
        gray.put_pixel(x, y, Luma([luminance(p)]));
    }
    gray
}

/// Expand a grayscale (or binary) buffer back to opaque RGBA for encoding.
pub fn to_rgba(gray: &GrayImage) -> RgbaImage {
    let (w, h) = gray.dimensions();
    let mut out = RgbaImage::new(w, h);
    for (x, y, p) in gray.enumerate_pixels() {
        let v = p.0[0];
        out.put_pixel(x, y, Rgba([v, v, v, 255]));
    }
    out
}

#[inline]
fn luminance(p: &Rgba<u8>) -> u8 {
    let weighted =
        0.299 * p.0[0] as f32 + 0.587 * p.0[1] as f32 + 0.114 * p.0[2] as f32;
    // round-half-up, clamped to the byte range
    (weighted + 0.5).floor().min(255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lum(r: u8, g: u8, b: u8) -> u8 {
        luminance(&Rgba([r, g, b, 255]))
    }

    #[test]
    fn primary_channel_weights() {
        assert_eq!(lum(255, 0, 0), 76);
        assert_eq!(lum(0, 255, 0), 150);
        assert_eq!(lum(0, 0, 255), 29);
    }

    #[test]
    fn white_and_black_are_preserved() {
        assert_eq!(lum(255, 255, 255), 255);
        assert_eq!(lum(0, 0, 0), 0);
    }

    #[test]
    fn alpha_is_ignored() {
        assert_eq!(luminance(&Rgba([100, 100, 100, 0])), 100);
    }

    #[test]
    fn buffer_conversion_matches_per_pixel_weights() {
        let img = RgbaImage::from_pixel(4, 3, Rgba([255, 0, 0, 255]));
        let gray = grayscale(&img);
        assert_eq!(gray.dimensions(), (4, 3));
        assert!(gray.pixels().all(|p| p.0[0] == 76));
    }

    #[test]
    fn rgba_expansion_is_opaque_and_neutral() {
        let gray = GrayImage::from_pixel(2, 2, Luma([200]));
        let rgba = to_rgba(&gray);
        assert!(rgba.pixels().all(|p| p.0 == [200, 200, 200, 255]));
    }
}
