use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("Failed to frame message: {0}")]
    Framing(String),
}
