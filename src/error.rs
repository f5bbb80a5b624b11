//! Error types for the cache and its hosting server
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Error Enum ==
/// Unified error type for the crate.
///
/// Cache lookups never fail: a missing or expired key is `None`, not an error.
/// The only cache-level failure is constructing a cache with no room in it.
#[derive(Error, Debug)]
pub enum Error {
    /// Cache constructed with a capacity of zero
    #[error("Invalid capacity: {0} (must be greater than zero)")]
    InvalidCapacity(usize),

    /// Configuration value could not be used
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Socket level failure in the server
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
