//! Error types for chunkform
//!
//! This module defines all error types used throughout the translation pipeline.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every error is surfaced to the caller of the single operation that raised it.
//! Nothing is retried internally and no operation leaves partially applied state.

use crate::version::FormatVersion;
use thiserror::Error;

/// Result type alias for chunkform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the translation pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No format link is registered for the requested version
    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(FormatVersion),

    /// Bytes or a component value do not match the expected shape/layout
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// A value of the wrong type was supplied
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type the slot holds
        expected: String,
        /// Type that was supplied
        found: String,
    },

    /// Numeric id or namespaced id is already registered
    #[error("Duplicate registration: {id} <-> {name}")]
    DuplicateRegistration {
        /// Numeric id of the rejected entry
        id: u32,
        /// Namespaced id of the rejected entry
        name: String,
    },

    /// Numeric id or namespaced id is not registered
    #[error("Missing registration: {0}")]
    MissingRegistration(String),

    /// Invalid slice request (zero step, out of range index)
    #[error("Slice error: {0}")]
    Slice(String),

    /// Format chain construction error
    #[error("Invalid format chain: {0}")]
    InvalidChain(String),

    /// Unparseable namespaced id or blockstate string
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a [`Error::StructuralMismatch`] with a formatted message.
    pub fn mismatch(detail: impl Into<String>) -> Self {
        Error::StructuralMismatch(detail.into())
    }

    /// Shorthand for a [`Error::TypeMismatch`].
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Shorthand for a [`Error::Slice`] with a formatted message.
    pub fn slice(detail: impl Into<String>) -> Self {
        Error::Slice(detail.into())
    }
}
