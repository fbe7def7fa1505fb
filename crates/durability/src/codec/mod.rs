//! Payload codecs
//!
//! A codec turns one version's raw bytes into a [`chunkform_core::Compound`]
//! and back. [`TagCodec`] is the default for links that declare none.

mod tag;
mod traits;

pub use tag::TagCodec;
pub use traits::PayloadCodec;
