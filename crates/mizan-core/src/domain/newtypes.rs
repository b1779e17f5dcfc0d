//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for identifiers and credentials. Each newtype
//! validates at construction time so the rest of the codebase can assume
//! well-formed values.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// FileId - opaque remote file handle
// ============================================================================

/// Opaque identifier for the remote ledger file
///
/// Assigned by the remote store on creation and cached for the session.
/// The value is provider-specific and never interpreted locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Creates a FileId, rejecting empty or whitespace-only values
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::InvalidFileId(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// PaymentId / CustomAssetId - client-generated row identifiers
// ============================================================================

/// Identifier for a tracked payment row
///
/// Client-generated, unique within a snapshot. Freshly created rows use
/// a `pay_` prefix plus a random UUID; imported rows keep whatever opaque
/// string the payload carried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Creates a PaymentId from an existing value
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::InvalidPaymentId(value));
        }
        Ok(Self(value))
    }

    /// Generates a fresh unique PaymentId
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("pay_{}", Uuid::new_v4().simple()))
    }

    /// Returns the raw identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PaymentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PaymentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier for a user-defined asset row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomAssetId(String);

impl CustomAssetId {
    /// Creates a CustomAssetId from an existing value
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::InvalidCustomAssetId(value));
        }
        Ok(Self(value))
    }

    /// Generates a fresh unique CustomAssetId
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("asset_{}", Uuid::new_v4().simple()))
    }

    /// Returns the raw identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CustomAssetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CustomAssetId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// BearerToken - opaque credential supplied by the auth gate
// ============================================================================

/// An OAuth bearer token for remote store requests
///
/// The token is acquired elsewhere (the auth capability); this type only
/// guarantees the value is non-empty. Debug output is redacted so tokens
/// never leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Creates a BearerToken, rejecting empty or whitespace-only values
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::InvalidToken(
                "token must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the raw token for use in an Authorization header
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(***)")
    }
}

impl FromStr for BearerToken {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
