//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while building regression fixtures
#[derive(Debug, Error)]
pub enum TestError {
    /// A fixture description was malformed
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),

    /// The pixel buffer rejected the fixture
    #[error("core error: {0}")]
    Core(#[from] morphkit_core::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
