//! Adaptive image preprocessing for optical character recognition.
//!
//! Turns noisy, skewed, low-contrast page scans into a normalized form that
//! maximizes recognition accuracy downstream: decode/resize, grayscale,
//! tile-histogram contrast enhancement, median denoise, projection-profile
//! deskew, adaptive/Sauvola/Otsu binarization, 3x3 morphology, and
//! unsharp-mask sharpening, re-encoded as lossless PNG.
//!
//! This is a pure transformation library: no recognition, no document
//! semantics, no network or filesystem surface. Output pixels are
//! deterministic given identical input bytes and configuration.
//!
//! ```no_run
//! use scanprep::{PreprocessOptions, Preprocessor};
//!
//! # fn run(scan_bytes: &[u8]) -> Result<(), scanprep::PreprocessError> {
//! let pipeline = Preprocessor::new(PreprocessOptions::default());
//! let page = pipeline.preprocess(scan_bytes, 2480, 3508)?;
//! println!("ready for OCR: {}x{}", page.width, page.height);
//! # Ok(())
//! # }
//! ```

pub mod binarize;
pub mod codec;
pub mod contrast;
pub mod denoise;
pub mod deskew;
pub mod error;
pub mod gray;
pub mod integral;
pub mod morphology;
pub mod options;
pub mod pipeline;
pub mod resize;
pub mod sharpen;

pub use codec::{ImageCodec, PixelSource};
pub use contrast::ContrastParams;
pub use deskew::SkewSearch;
pub use error::PreprocessError;
pub use morphology::MorphOp;
pub use options::{BinarizationMethod, PreprocessOptions};
pub use pipeline::{PreprocessedImage, Preprocessor};
