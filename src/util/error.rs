//! Error types for deptheval.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for deptheval operations.
pub type DepthEvalResult<T> = std::result::Result<T, DepthEvalError>;

/// Errors that can occur while loading, aligning or scoring depth maps.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DepthEvalError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Width or height is zero, or the pixel count overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Two grids that must share a shape do not.
    #[error("dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// The backing buffer is shorter than the declared shape.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// An image could not be opened or decoded.
    #[error("cannot load image {}: {reason}", path.display())]
    ImageIo { path: PathBuf, reason: String },
    /// Reference and candidate share no pixel with a valid depth reading.
    #[error("no overlap between {candidate} & {reference}")]
    NoOverlap { candidate: String, reference: String },
    /// The validity mask has no true entries.
    #[error("validity mask is empty")]
    EmptyMask,
    /// The grid is smaller than the SSIM window.
    #[error("image {width}x{height} is smaller than the {window}x{window} window")]
    ImageTooSmall {
        width: usize,
        height: usize,
        window: usize,
    },
    /// A filesystem operation failed.
    #[error("i/o error at {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
    /// Writing the record set failed.
    #[error("csv error: {reason}")]
    Csv { reason: String },
}

impl DepthEvalError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        DepthEvalError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

impl From<csv::Error> for DepthEvalError {
    fn from(err: csv::Error) -> Self {
        DepthEvalError::Csv {
            reason: err.to_string(),
        }
    }
}
