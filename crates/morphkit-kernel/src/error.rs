//! Error types for morphkit-kernel
//!
//! Every problem with a kernel description is reported as
//! [`KernelError::InvalidSpec`]; no partially built kernel is ever returned.

use thiserror::Error;

/// Errors that can occur while building kernels
#[derive(Debug, Error)]
pub enum KernelError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] morphkit_core::Error),

    /// Malformed or unsupported kernel description
    #[error("invalid kernel specification: {0}")]
    InvalidSpec(String),

    /// A `@file` kernel description could not be read
    #[error("failed to read kernel file '{path}': {source}")]
    Io {
        /// File named after the `@`
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Kernel value storage could not be allocated
    #[error("memory allocation failed")]
    AllocationFailed,
}

impl KernelError {
    pub(crate) fn spec(msg: impl Into<String>) -> Self {
        KernelError::InvalidSpec(msg.into())
    }
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;
