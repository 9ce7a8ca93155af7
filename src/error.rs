use thiserror::Error;

/// Failures surfaced by the preprocessing pipeline.
///
/// Every stage is deterministic, so nothing here is retried internally —
/// retrying with the same input reproduces the same failure. Callers that
/// need a fallback should pass the original image through unprocessed.
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// Declared source dimensions were not both positive.
    /// Raised before any decode attempt.
    #[error("invalid source dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encode failed: {0}")]
    Encode(String),

    /// The blocking worker running the pipeline could not be joined.
    /// Only produced by the async entry point.
    #[error("preprocessing task failed: {0}")]
    Task(String),
}
