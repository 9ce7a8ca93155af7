//! Grayscale to two-level reduction.
//!
//! Three strategies with different illumination assumptions:
//! - adaptive local mean (windowed mean minus a constant),
//! - Sauvola (local mean + stddev, handles uneven lighting),
//! - Otsu (single global threshold from the histogram).
//!
//! Every output pixel is exactly 0 or 255.

use image::{GrayImage, Luma};

use crate::integral::IntegralImage;

/// Sauvola dynamic-range constant for 8-bit input.
const SAUVOLA_R: f64 = 128.0;

/// Force a usable window side: odd and at least 3.
pub(crate) fn normalize_block_size(block_size: u32) -> u32 {
    (block_size | 1).max(3)
}

/// Adaptive local-mean threshold.
///
/// Each pixel is compared against the mean of the square `block_size`
/// window centered on it (clamped at the borders, so edge windows shrink
/// rather than wrap): white if `gray > mean - c`, else black. On a
/// perfectly uniform buffer every pixel equals its local mean, so any
/// positive `c` yields an all-white result.
pub fn adaptive_mean(gray: &GrayImage, block_size: u32, c: f32) -> GrayImage {
    let radius = normalize_block_size(block_size) / 2;
    let integral = IntegralImage::new(gray);
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mean = integral.window_mean(x, y, radius);
            let v = gray.get_pixel(x, y).0[0] as f64;
            let bit = if v > mean - c as f64 { 255 } else { 0 };
            out.put_pixel(x, y, Luma([bit]));
        }
    }
    out
}

/// Sauvola local threshold: `T = mean * (1 + k * (stddev / R - 1))`.
///
/// Needs the squared summed-area table for the windowed stddev; still O(1)
/// per pixel.
pub fn sauvola(gray: &GrayImage, block_size: u32, k: f32) -> GrayImage {
    let radius = normalize_block_size(block_size) / 2;
    let integral = IntegralImage::with_squares(gray);
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let (mean, std) = integral.window_stats(x, y, radius);
            let threshold = mean * (1.0 + k as f64 * (std / SAUVOLA_R - 1.0));
            let v = gray.get_pixel(x, y).0[0] as f64;
            let bit = if v > threshold { 255 } else { 0 };
            out.put_pixel(x, y, Luma([bit]));
        }
    }
    out
}

/// Otsu global threshold applied to the whole buffer.
pub fn otsu(gray: &GrayImage) -> GrayImage {
    let threshold = otsu_threshold(gray);
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);
    for (x, y, p) in gray.enumerate_pixels() {
        let bit = if p.0[0] > threshold { 255 } else { 0 };
        out.put_pixel(x, y, Luma([bit]));
    }
    out
}

/// Select the Otsu threshold: the `t` maximizing between-class variance
/// `w0 * w1 * (mu0 - mu1)^2` over the 256-bin histogram. The first maximum
/// wins, keeping the choice deterministic on flat variance plateaus.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for p in gray.pixels() {
        histogram[p.0[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let total_weighted: u64 = histogram
        .iter()
        .enumerate()
        .map(|(v, &n)| v as u64 * n)
        .sum();

    let mut best_t = 0u8;
    let mut best_variance = f64::NEG_INFINITY;
    let mut count_below = 0u64;
    let mut sum_below = 0u64;

    for t in 0..256usize {
        count_below += histogram[t];
        sum_below += t as u64 * histogram[t];
        let count_above = total - count_below;
        if count_below == 0 || count_above == 0 {
            continue;
        }

        let w0 = count_below as f64 / total as f64;
        let w1 = count_above as f64 / total as f64;
        let mu0 = sum_below as f64 / count_below as f64;
        let mu1 = (total_weighted - sum_below) as f64 / count_above as f64;
        let variance = w0 * w1 * (mu0 - mu1) * (mu0 - mu1);
        if variance > best_variance {
            best_variance = variance;
            best_t = t as u8;
        }
    }

    best_t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_binary(img: &GrayImage) -> bool {
        img.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
    }

    #[test]
    fn block_size_normalization() {
        assert_eq!(normalize_block_size(15), 15);
        assert_eq!(normalize_block_size(14), 15);
        assert_eq!(normalize_block_size(0), 3);
        assert_eq!(normalize_block_size(1), 3);
    }

    #[test]
    fn mean_uniform_buffer_goes_all_white() {
        for block in [3u32, 15, 31] {
            let gray = GrayImage::from_pixel(20, 20, Luma([128]));
            let bin = adaptive_mean(&gray, block, 8.0);
            assert!(bin.pixels().all(|p| p.0[0] == 255), "block={block}");
        }
    }

    #[test]
    fn mean_separates_dark_text_from_light_ground() {
        // dark 3x3 blob in a light field
        let mut gray = GrayImage::from_pixel(21, 21, Luma([200]));
        for y in 9..12 {
            for x in 9..12 {
                gray.put_pixel(x, y, Luma([20]));
            }
        }
        let bin = adaptive_mean(&gray, 15, 8.0);
        assert!(is_binary(&bin));
        assert_eq!(bin.get_pixel(10, 10).0[0], 0);
        assert_eq!(bin.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn sauvola_uniform_light_buffer_goes_white() {
        // stddev 0 => T = 128 * (1 - k) = 89.6, so 128 > T
        let gray = GrayImage::from_pixel(16, 16, Luma([128]));
        let bin = sauvola(&gray, 15, 0.3);
        assert!(bin.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn sauvola_black_buffer_stays_black() {
        let gray = GrayImage::from_pixel(16, 16, Luma([0]));
        let bin = sauvola(&gray, 15, 0.3);
        assert!(bin.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn sauvola_separates_text_under_gradient() {
        // illumination ramps across the page; text is locally much darker
        let mut gray = GrayImage::new(64, 16);
        for y in 0..16 {
            for x in 0..64 {
                let ground = 120 + x as i32; // 120..183
                gray.put_pixel(x, y, Luma([ground as u8]));
            }
        }
        for x in 10..14 {
            gray.put_pixel(x, 8, Luma([10]));
        }
        for x in 50..54 {
            gray.put_pixel(x, 8, Luma([40]));
        }
        let bin = sauvola(&gray, 15, 0.3);
        assert!(is_binary(&bin));
        assert_eq!(bin.get_pixel(11, 8).0[0], 0);
        assert_eq!(bin.get_pixel(51, 8).0[0], 0);
        assert_eq!(bin.get_pixel(30, 4).0[0], 255);
    }

    #[test]
    fn otsu_bimodal_splits_on_class_boundary() {
        let mut gray = GrayImage::new(16, 16);
        for (i, p) in gray.pixels_mut().enumerate() {
            *p = Luma([if i % 2 == 0 { 30 } else { 220 }]);
        }
        let bin = otsu(&gray);
        for (i, p) in bin.pixels().enumerate() {
            if i % 2 == 0 {
                assert_eq!(p.0[0], 0);
            } else {
                assert_eq!(p.0[0], 255);
            }
        }
    }

    #[test]
    fn otsu_threshold_lands_between_modes() {
        let mut gray = GrayImage::new(10, 10);
        for (i, p) in gray.pixels_mut().enumerate() {
            *p = Luma([if i < 50 { 30 } else { 220 }]);
        }
        let t = otsu_threshold(&gray);
        assert!((30..220).contains(&t), "t={t}");
    }

    #[test]
    fn otsu_empty_histogram_defaults_to_zero() {
        let gray = GrayImage::new(0, 0);
        assert_eq!(otsu_threshold(&gray), 0);
    }
}
