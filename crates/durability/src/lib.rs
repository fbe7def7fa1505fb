//! Durability layer for chunkform
//!
//! This crate handles everything that touches version-specific bytes:
//!
//! - Payload codecs: PayloadCodec trait and the default binary TagCodec
//! - Format links: per-version codec, layout, persisted components and deltas
//! - Format chain: decode, upgrade, downgrade, translate, encode, and the
//!   universal pipeline (to_universal / from_universal)
//! - Palette remapping between identifier registries

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod format;
pub mod remap;

pub use codec::{PayloadCodec, TagCodec};
pub use format::{Delta, FormatChain, FormatChainBuilder, FormatLink, Layout, ResolvedLink};
pub use remap::{remap_ids, remap_sections};
