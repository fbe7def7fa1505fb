//! Format version identifiers and the payloads tagged with them
//!
//! A [`FormatVersion`] names one revision of one save-format family.
//! Versions are totally ordered; the format chain is built in strictly
//! increasing version order.
//!
//! ## Payload Flow
//!
//! ```text
//! RawPayload { version, bytes }  --decode-->  VersionedData { version, root }
//!          ^                                          |
//!          +-------------------encode-----------------+
//! ```

use crate::tag::Compound;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One revision of a save-format family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatVersion(u32);

impl FormatVersion {
    /// Create a version from its numeric value
    pub const fn new(value: u32) -> Self {
        FormatVersion(value)
    }

    /// Get the numeric value
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// The version directly after this one, if representable
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(FormatVersion)
    }
}

impl From<u32> for FormatVersion {
    fn from(value: u32) -> Self {
        FormatVersion(value)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Opaque bytes tagged with the version they were written by.
///
/// Produced and consumed by the external storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    /// Declared format version
    pub version: FormatVersion,
    /// Encoded bytes
    pub bytes: Vec<u8>,
}

impl RawPayload {
    /// Create a payload
    pub fn new(version: impl Into<FormatVersion>, bytes: Vec<u8>) -> Self {
        RawPayload {
            version: version.into(),
            bytes,
        }
    }
}

/// A version's decoded representation
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedData {
    /// Version whose layout `root` follows
    pub version: FormatVersion,
    /// Decoded tag tree
    pub root: Compound,
}

impl VersionedData {
    /// Wrap a tag tree decoded under `version`
    pub fn new(version: impl Into<FormatVersion>, root: Compound) -> Self {
        VersionedData {
            version: version.into(),
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_ordered() {
        assert!(FormatVersion::new(1343) < FormatVersion::new(1444));
        assert_eq!(FormatVersion::new(7).next(), Some(FormatVersion::new(8)));
        assert_eq!(FormatVersion::new(u32::MAX).next(), None);
    }

    #[test]
    fn version_serializes_transparently() {
        let json = serde_json::to_string(&FormatVersion::new(2844)).unwrap();
        assert_eq!(json, "2844");
        let back: FormatVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FormatVersion::new(2844));
    }

    #[test]
    fn display_has_prefix() {
        assert_eq!(FormatVersion::new(19).to_string(), "v19");
    }
}
