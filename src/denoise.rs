//! Impulse-noise suppression.

use image::{GrayImage, Luma};

/// 3x3 median filter with edge clamping.
///
/// Out-of-bounds samples replicate the nearest in-bounds pixel. Removes
/// isolated salt/pepper outliers while preserving step edges; a fixed sort
/// of the 9 samples is cheaper than anything clever at this window size.
pub fn median3(gray: &GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut window = [0u8; 9];
            let mut i = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                    window[i] = gray.get_pixel(sx, sy).0[0];
                    i += 1;
                }
            }
            window.sort_unstable();
            out.put_pixel(x, y, Luma([window[4]]));
        }
    }
    out
}
