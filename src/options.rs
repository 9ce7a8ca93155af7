//! Pipeline configuration.
//!
//! `PreprocessOptions` is an immutable value constructed once per call —
//! there is no shared or global configuration state. Defaults follow the
//! tuning that works well for scanned A4/letter pages feeding an OCR engine.

use serde::{Deserialize, Serialize};

use crate::contrast::ContrastParams;
use crate::deskew::SkewSearch;
use crate::morphology::MorphOp;

/// Strategy used to reduce the grayscale buffer to two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinarizationMethod {
    /// Adaptive local mean threshold (windowed mean minus a constant).
    Mean,
    /// Sauvola local threshold — mean and stddev, suited to uneven lighting.
    Sauvola,
    /// Otsu global threshold — maximizes between-class histogram variance.
    Otsu,
}

/// Immutable per-invocation configuration for [`Preprocessor`].
///
/// [`Preprocessor`]: crate::pipeline::Preprocessor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Minimum output width; smaller sources are upscaled (capped at 2x).
    pub min_width: u32,
    /// Minimum output height; smaller sources are upscaled (capped at 2x).
    pub min_height: u32,
    /// Binarize the grayscale buffer; `false` emits grayscale output.
    pub adaptive_threshold: bool,
    /// Side of the square window for local thresholding. Must be odd and
    /// positive; other values are normalized up to the nearest valid size.
    pub block_size: u32,
    /// Constant subtracted from the local mean (Mean method only).
    pub threshold_c: f32,
    /// Tile-histogram equalization before thresholding.
    pub contrast_enhancement: bool,
    /// 3x3 median filter before thresholding.
    pub noise_reduction: bool,
    /// Detect skew and re-render the source rotated when it exceeds the
    /// search tolerance.
    pub deskew: bool,
    pub binarization_method: BinarizationMethod,
    /// Sauvola `k` parameter (typical range 0.2-0.5).
    pub sauvola_k: f32,
    /// Unsharp-mask the grayscale buffer before (or instead of) binarization.
    pub sharpen: bool,
    /// Optional morphological cleanup applied to the binarized buffer.
    pub morphology: Option<MorphOp>,
    pub contrast: ContrastParams,
    pub skew_search: SkewSearch,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            min_width: 1024,
            min_height: 768,
            adaptive_threshold: true,
            block_size: 15,
            threshold_c: 8.0,
            contrast_enhancement: true,
            noise_reduction: true,
            deskew: false,
            binarization_method: BinarizationMethod::Mean,
            sauvola_k: 0.3,
            sharpen: false,
            morphology: None,
            contrast: ContrastParams::default(),
            skew_search: SkewSearch::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = PreprocessOptions::default();
        assert_eq!(opts.min_width, 1024);
        assert_eq!(opts.min_height, 768);
        assert!(opts.adaptive_threshold);
        assert_eq!(opts.block_size, 15);
        assert_eq!(opts.threshold_c, 8.0);
        assert!(opts.contrast_enhancement);
        assert!(opts.noise_reduction);
        assert!(!opts.deskew);
        assert_eq!(opts.binarization_method, BinarizationMethod::Mean);
        assert!((opts.sauvola_k - 0.3).abs() < f32::EPSILON);
        assert!(!opts.sharpen);
        assert!(opts.morphology.is_none());
    }

    #[test]
    fn method_serializes_lowercase() {
        let json = serde_json::to_string(&BinarizationMethod::Sauvola).unwrap();
        assert_eq!(json, "\"sauvola\"");
    }

    #[test]
    fn options_roundtrip_through_json() {
        let mut opts = PreprocessOptions::default();
        opts.deskew = true;
        opts.binarization_method = BinarizationMethod::Otsu;
        let json = serde_json::to_string(&opts).unwrap();
        let back: PreprocessOptions = serde_json::from_str(&json).unwrap();
        assert!(back.deskew);
        assert_eq!(back.binarization_method, BinarizationMethod::Otsu);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let back: PreprocessOptions = serde_json::from_str("{\"deskew\": true}").unwrap();
        assert!(back.deskew);
        assert_eq!(back.min_width, 1024);
        assert_eq!(back.binarization_method, BinarizationMethod::Mean);
    }
}
