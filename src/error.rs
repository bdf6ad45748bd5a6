//! Error types for the cache library
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type shared by every cache backend.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Malformed caller input, such as an empty key or prefix
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Required setup is missing or unusable, such as an absent cache
    /// directory or an instance used before a namespace was selected
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backing store failed while reading or writing
    #[error("Storage error: {0}")]
    Storage(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
