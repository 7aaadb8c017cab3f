//! Error types for morphkit-core
//!
//! Provides a unified error type for the pixel buffer collaborator.
//! Each variant captures enough context for diagnostics without exposing
//! internal buffer layout details.

use thiserror::Error;

/// morphkit-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Image dimension mismatch
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Channel layout mismatch between two images
    #[error("channel mismatch: expected {expected} channels, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A pixel window could not be produced
    #[error("unable to acquire {width}x{height} window at ({x}, {y})")]
    WindowUnavailable {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    /// Memory allocation failed
    #[error("memory allocation failed")]
    AllocationFailed,
}

/// Result type alias for morphkit-core operations
pub type Result<T> = std::result::Result<T, Error>;
