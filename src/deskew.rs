//! Projection-profile skew estimation.
//!
//! Text rows produce a sharply peaked horizontal projection when correctly
//! aligned; tilting the page smears the peaks and lowers the projection's
//! variance. The estimator rotates sample coordinates through a range of
//! candidate angles and keeps the one whose dark-pixel row histogram has the
//! highest variance.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum dark-pixel fraction for a meaningful projection. Below this the
/// page is essentially blank and the estimate would be noise.
const MIN_INK_RATIO: f64 = 0.02;

/// Candidate-angle search parameters.
///
/// The range and step are conventional defaults for scanned documents, not
/// validated bounds — pages photographed at steeper angles need a wider
/// search than this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewSearch {
    /// Candidates span `-max_angle_deg..=max_angle_deg`.
    pub max_angle_deg: f32,
    pub step_deg: f32,
    /// Detected angles at or below this magnitude are not worth a re-render.
    pub tolerance_deg: f32,
}

impl Default for SkewSearch {
    fn default() -> Self {
        Self {
            max_angle_deg: 5.0,
            step_deg: 0.5,
            tolerance_deg: 0.3,
        }
    }
}

/// Estimate the page skew in degrees. Positive angles mean text lines slope
/// downward left-to-right; rotating the source by the negated result aligns
/// them. Returns 0.0 for blank or near-blank buffers.
pub fn detect_skew(gray: &GrayImage, search: &SkewSearch) -> f32 {
    let (w, h) = gray.dimensions();
    if w < 2 || h < 2 {
        return 0.0;
    }

    // quick binarization at the overall mean, independent of the
    // configured binarizer
    let raw = gray.as_raw();
    let total: u64 = raw.iter().map(|&v| v as u64).sum();
    let mean = (total / raw.len() as u64) as u8;
    let dark_count = raw.iter().filter(|&&v| v < mean).count();
    if (dark_count as f64 / raw.len() as f64) < MIN_INK_RATIO {
        return 0.0;
    }

    let step = search.step_deg.abs().max(0.01);
    let max = search.max_angle_deg.abs();
    let candidates = (2.0 * max / step).round() as i32;

    let mut best_angle = 0.0f32;
    let mut best_score = projection_variance(gray, mean, 0.0);
    for i in 0..=candidates {
        let angle = -max + i as f32 * step;
        let score = projection_variance(gray, mean, angle);
        if score > best_score {
            best_score = score;
            best_angle = angle;
        }
    }

    debug!(angle = best_angle, score = best_score, "Skew estimate");
    best_angle
}

/// Variance of the dark-pixel row histogram after rotating sample
/// coordinates by `angle_deg` about the image center. Every second column
/// is sampled; the projection shape survives the subsampling.
fn projection_variance(gray: &GrayImage, dark_below: u8, angle_deg: f32) -> f64 {
    let (w, h) = gray.dimensions();
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let cx = (w as f32 - 1.0) / 2.0;
    let cy = (h as f32 - 1.0) / 2.0;

    let mut histogram = vec![0u32; h as usize];
    for y in 0..h {
        for x in (0..w).step_by(2) {
            if gray.get_pixel(x, y).0[0] >= dark_below {
                continue;
            }
            let row = cy - (x as f32 - cx) * sin + (y as f32 - cy) * cos;
            let row = row.round() as i64;
            if (0..h as i64).contains(&row) {
                histogram[row as usize] += 1;
            }
        }
    }

    let n = histogram.len() as f64;
    let mean = histogram.iter().map(|&v| v as f64).sum::<f64>() / n;
    histogram
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}
