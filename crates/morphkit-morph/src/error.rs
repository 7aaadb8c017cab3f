//! Error types for morphkit-morph

use thiserror::Error;

/// Errors that can occur while applying a morphology method
#[derive(Debug, Error)]
pub enum MorphError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] morphkit_core::Error),

    /// Kernel construction or transform error
    #[error("kernel error: {0}")]
    Kernel(#[from] morphkit_kernel::KernelError),

    /// Unknown or unsupported method name
    #[error("invalid method: {0}")]
    InvalidMethod(String),

    /// Setting value that cannot be used
    #[error("invalid setting '{key}': {value}")]
    InvalidSetting { key: String, value: String },

    /// The progress monitor asked to stop
    #[error("cancelled by progress monitor: {0}")]
    Cancelled(&'static str),
}

/// Result type for morphology operations
pub type MorphResult<T> = Result<T, MorphError>;
