//! # Error Types
//!
//! Errors raised while constructing foundational values. Domain crates
//! define their own richer enums (`StateError`, `TransitionError`,
//! `StoreError`).

use thiserror::Error;

/// Top-level error type for foundational operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    /// An identifier failed validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A timestamp could not be parsed or constructed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
