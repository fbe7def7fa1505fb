//! Engine layer for chunkform
//!
//! Ties the lower layers together behind one facade:
//! - TranslatorConfig: chain policy and section shapes from `chunkform.toml`
//! - Translator: load/save chunks through the format chain under per-chunk locks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod translator;

pub use config::{SectionConfig, TranslatorConfig, CONFIG_FILE_NAME};
pub use translator::{ChunkKey, Translator};
