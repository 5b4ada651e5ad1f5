//! Opaque trip-session identifier.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// An opaque session identifier minted by the remote advisor.
///
/// The server never inspects its contents; it only requires the identifier
/// to be non-empty, because an empty identifier from the advisor means the
/// session was never established.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw identifier, rejecting the empty string.
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DomainError::EmptySessionId);
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
