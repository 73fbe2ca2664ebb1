//! # Event Identifier
//!
//! The host application owns event records and chooses their identifiers
//! (database object ids, slugs, UUIDs). The engine only requires that an id
//! is a non-empty string without surrounding whitespace.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AtlasError;

/// Identifier of an event record in the host application's store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct EventId(String);

impl EventId {
    /// Validate and wrap a host-supplied identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, AtlasError> {
        let id = id.into();
        if id.is_empty() {
            return Err(AtlasError::InvalidIdentifier(
                "event id must not be empty".to_string(),
            ));
        }
        if id.trim() != id {
            return Err(AtlasError::InvalidIdentifier(format!(
                "event id must not have surrounding whitespace: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventId {
    type Error = AtlasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for EventId {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
