//! Common error types for durafill

use thiserror::Error;

/// Common result type for durafill operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving configuration and profiles
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML file could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (unknown profile, missing input path)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
