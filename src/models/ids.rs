//! Newtype wrapper for record identifiers.
//!
//! Keeps record ids from being mixed up with other strings (serial
//! numbers in particular) at compile time.

use serde::{Deserialize, Serialize};

/// Unique identifier for a machine record (UUID string).
///
/// Generated once at record creation and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates an identifier from an existing string value.
    #[inline]
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Generates a fresh random identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns a reference to the inner string.
    #[inline]
    #[must_use]
    pub fn as_inner(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner string.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for RecordId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<String> for RecordId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}
