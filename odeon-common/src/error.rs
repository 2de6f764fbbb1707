//! Common error types for Odeon services

use thiserror::Error;

/// Common result type for Odeon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Odeon services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
