//! Pipeline orchestrator.
//!
//! Sequences the preprocessing stages per configuration:
//!
//! Decoding -> Grayscaling -> [Enhancing] -> [Denoising]
//!   -> [DeskewDetecting -> Rotating -> Grayscaling -> [Enhancing] -> [Denoising]]
//!   -> [Sharpening] -> [Binarizing] -> [Morphing] -> Encoding -> Done
//!
//! Bracketed stages are skipped when disabled. The deskew branch re-enters
//! the grayscale/enhance/denoise stages exactly once — no iterative
//! refinement. Any stage failure ends the run with the originating error.
//! Every stage returns a fresh buffer; nothing is aliased across stages and
//! no state survives the call, so independent runs need no coordination.

use std::sync::Arc;

use base64::Engine as _;
use image::GrayImage;
use tracing::debug;

use crate::binarize;
use crate::codec::{ImageCodec, PixelSource};
use crate::contrast;
use crate::denoise;
use crate::deskew;
use crate::error::PreprocessError;
use crate::gray;
use crate::morphology;
use crate::options::{BinarizationMethod, PreprocessOptions};
use crate::resize;
use crate::sharpen;

/// Result of a pipeline run: lossless PNG bytes plus final dimensions.
/// Immutable once produced.
#[derive(Debug, Clone)]
pub struct PreprocessedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PreprocessedImage {
    /// The byte-equivalent data reference (`data:image/png;base64,...`),
    /// rendered on demand.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Adaptive preprocessing pipeline for OCR input.
///
/// Holds only the codec seam and an immutable configuration; every
/// invocation owns its buffers exclusively, so one instance may serve
/// concurrent callers.
pub struct Preprocessor {
    codec: Box<dyn PixelSource>,
    options: PreprocessOptions,
}

impl Preprocessor {
    /// Pipeline with the default `image`-crate codec.
    pub fn new(options: PreprocessOptions) -> Self {
        Self::with_codec(Box::new(ImageCodec), options)
    }

    /// Pipeline over a custom decode/encode backend.
    pub fn with_codec(codec: Box<dyn PixelSource>, options: PreprocessOptions) -> Self {
        Self { codec, options }
    }

    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    /// Run the full pipeline over one image.
    ///
    /// `orig_width`/`orig_height` are the source's declared dimensions; both
    /// must be positive, checked before any decode attempt. Output is
    /// deterministic: identical bytes + configuration produce identical
    /// output bytes.
    pub fn preprocess(
        &self,
        bytes: &[u8],
        orig_width: u32,
        orig_height: u32,
    ) -> Result<PreprocessedImage, PreprocessError> {
        let opts = &self.options;

        // 1. Plan target dimensions (validates declared dimensions)
        let (target_w, target_h) =
            resize::plan_dimensions(orig_width, orig_height, opts)?;

        // 2. Decode at target size
        let pixels = self.codec.decode(bytes, target_w, target_h)?;

        // 3. Grayscale + optional enhance/denoise
        let mut working = self.reduce_and_clean(&pixels);
        drop(pixels);

        // 4. Deskew: detect, re-render rotated, repeat the cleanup once
        if opts.deskew {
            let angle = deskew::detect_skew(&working, &opts.skew_search);
            if angle.abs() > opts.skew_search.tolerance_deg {
                debug!(angle, "Re-rendering source with skew correction");
                let rotated =
                    self.codec
                        .decode_rotated(bytes, target_w, target_h, -angle)?;
                working = self.reduce_and_clean(&rotated);
            }
        }

        // 5. Sharpen the grayscale stream (before, or instead of, binarization)
        if opts.sharpen {
            working = sharpen::unsharp_mask(&working, sharpen::DEFAULT_AMOUNT);
        }

        // 6. Binarize + optional morphological cleanup
        let finished = if opts.adaptive_threshold {
            let binary = match opts.binarization_method {
                BinarizationMethod::Mean => {
                    binarize::adaptive_mean(&working, opts.block_size, opts.threshold_c)
                }
                BinarizationMethod::Sauvola => {
                    binarize::sauvola(&working, opts.block_size, opts.sauvola_k)
                }
                BinarizationMethod::Otsu => binarize::otsu(&working),
            };
            match opts.morphology {
                Some(op) => morphology::apply(&binary, op),
                None => binary,
            }
        } else {
            working
        };

        // 7. Encode
        let encoded = self.codec.encode(&gray::to_rgba(&finished))?;
        debug!(
            width = target_w,
            height = target_h,
            png_size = encoded.len(),
            "Image preprocessed"
        );

        Ok(PreprocessedImage {
            bytes: encoded,
            width: target_w,
            height: target_h,
        })
    }

    /// Await-friendly entry point: runs the CPU-bound pipeline on the
    /// blocking pool. Decode and encode are the suspension points callers
    /// can race externally; the pipeline itself has no cancellation.
    pub async fn preprocess_async(
        self: Arc<Self>,
        bytes: Vec<u8>,
        orig_width: u32,
        orig_height: u32,
    ) -> Result<PreprocessedImage, PreprocessError> {
        tokio::task::spawn_blocking(move || {
            self.preprocess(&bytes, orig_width, orig_height)
        })
        .await
        .map_err(|e| PreprocessError::Task(e.to_string()))?
    }

    /// Grayscale reduction followed by the configured enhance/denoise steps.
    /// Shared between the initial pass and the post-rotation pass.
    fn reduce_and_clean(&self, pixels: &image::RgbaImage) -> GrayImage {
        let mut working = gray::grayscale(pixels);
        if self.options.contrast_enhancement {
            working = contrast::equalize(&working, &self.options.contrast);
        }
        if self.options.noise_reduction {
            working = denoise::median3(&working);
        }
        working
    }
}
