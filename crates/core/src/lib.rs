//! Core types for chunkform
//!
//! This crate defines the foundational types used throughout the pipeline:
//! - Error: Error type hierarchy
//! - FormatVersion / RawPayload / VersionedData: versioned payloads
//! - Tag / Compound: typed tree every version decodes into
//! - NamespacedId, Block, BlockItem, Item: namespaced value records
//! - IdentifierRegistry: numeric id <-> namespaced id bijection
//! - BlockPalette: dense block palette

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod palette;
pub mod registry;
pub mod tag;
pub mod types;
pub mod version;

pub use error::{Error, Result};
pub use palette::BlockPalette;
pub use registry::{IdentifierRegistry, RegistryEntry};
pub use tag::{Compound, Tag, TagKind};
pub use types::{Block, BlockItem, Item, Namespaced, NamespacedId, Value};
pub use version::{FormatVersion, RawPayload, VersionedData};
