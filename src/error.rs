//! Error types for the contactgate service.

use thiserror::Error;

/// Main error type for contactgate operations.
///
/// The rate limiter itself never fails; a rejected request is a normal
/// [`Decision`](crate::ratelimit::Decision). These errors cover the ambient
/// concerns around it.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The email provider refused or failed the delivery
    #[error("Mail delivery error: {0}")]
    Mail(String),

    /// Outbound HTTP errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for contactgate operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
