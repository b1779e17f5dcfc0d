//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures and malformed identifiers.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote file identifier
    #[error("Invalid file ID: {0}")]
    InvalidFileId(String),

    /// Invalid payment identifier
    #[error("Invalid payment ID: {0}")]
    InvalidPaymentId(String),

    /// Invalid custom asset identifier
    #[error("Invalid custom asset ID: {0}")]
    InvalidCustomAssetId(String),

    /// Invalid bearer token (empty or whitespace-only)
    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),

    /// Unknown payment category key
    #[error("Unknown payment category: {0}")]
    UnknownCategory(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
