//! Payload codec trait definitions.

use chunkform_core::{Compound, Result};

/// Payload codec trait.
///
/// Converts between a version's on-disk bytes and its decoded tree. Every
/// format link has exactly one effective codec, declared or inherited.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync`; a built chain is shared across threads and
/// decodes concurrently.
///
/// # Errors
///
/// Both directions fail with [`chunkform_core::Error::StructuralMismatch`]
/// on input they cannot represent.
pub trait PayloadCodec: Send + Sync {
    /// Encode a decoded tree to bytes.
    fn encode(&self, root: &Compound) -> Result<Vec<u8>>;

    /// Decode bytes into a tree.
    ///
    /// Must consume the whole input; trailing bytes are an error.
    fn decode(&self, bytes: &[u8]) -> Result<Compound>;

    /// Unique codec identifier, used in logs and chain introspection.
    fn codec_id(&self) -> &str;
}
