//! chunkform - versioned voxel-world chunk translation
//!
//! Normalizes chunk data stored in many mutually incompatible, versioned
//! encodings into one version-agnostic in-memory model, and back again.
//!
//! # Quick Start
//!
//! ```rust
//! use chunkform::{
//!     Block, BlockComponent, ChunkKey, FormatLink, FormatVersion, NamespacedId, Translator,
//!     TranslatorConfig,
//! };
//!
//! # fn main() -> chunkform::Result<()> {
//! let links = vec![FormatLink::new(1), FormatLink::new(2)];
//! let translator = Translator::new(TranslatorConfig::default(), links)?;
//!
//! let mut chunk = translator.create_chunk(Block::new("core", "air"), NamespacedId::new("core", "plains"))?;
//! chunk
//!     .get_mut::<BlockComponent>()
//!     .expect("created chunks carry blocks")
//!     .set_block(0, 64, 0, "core:stone".parse()?)?;
//!
//! let key = ChunkKey::new(0, 0);
//! let raw = translator.save_chunk(key, &chunk, FormatVersion::new(1))?;
//! let loaded = translator.load_chunk(key, &raw)?;
//! assert_eq!(
//!     loaded.get::<BlockComponent>().unwrap().block_at(0, 64, 0)?.to_string(),
//!     "core:stone"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! | crate                   | layer                                              |
//! |-------------------------|----------------------------------------------------|
//! | `chunkform-core`        | errors, versions, tag tree, identities, registry   |
//! | `chunkform-storage`     | slices, array views, sections, components, chunk   |
//! | `chunkform-concurrency` | per-key lock table                                 |
//! | `chunkform-durability`  | codecs, format links, format chain, remapping      |
//! | `chunkform-engine`      | configuration and the translator facade            |

pub use chunkform_concurrency::{KeyLock, KeyLockTable};
pub use chunkform_core::{
    Block, BlockItem, BlockPalette, Compound, Error, FormatVersion, IdentifierRegistry, Item,
    Namespaced, NamespacedId, RawPayload, RegistryEntry, Result, Tag, TagKind, Value,
    VersionedData,
};
pub use chunkform_durability::{
    remap_ids, remap_sections, Delta, FormatChain, FormatChainBuilder, FormatLink, Layout,
    PayloadCodec, ResolvedLink, TagCodec,
};
pub use chunkform_engine::{ChunkKey, SectionConfig, Translator, TranslatorConfig, CONFIG_FILE_NAME};
pub use chunkform_storage::{
    normalize_slice, normalize_unbounded, sliced_array_size, AnyComponent, ArrayView,
    ArrayViewMut, Biome3DComponent, Biome3DData, BlockComponent, BlockComponentData, BlockEntity,
    BlockEntityComponent, BoxedValue, Component, ComponentRegistry, Entity, EntityComponent,
    HeightmapComponent, IndexArray3D, NormalizedSlice, RawComponent, SectionArrayMap, SliceSpec,
    UniversalChunk,
};
