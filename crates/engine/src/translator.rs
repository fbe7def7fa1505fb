//! Translator facade
//!
//! Owns the built format chain, the component registry and the per-chunk
//! lock table. Loads and saves hold the chunk's key lock for their whole
//! duration, so two callers never translate the same chunk at once while
//! different chunks proceed in parallel.
//!
//! ```text
//!   RawPayload(vN) --load_chunk--> UniversalChunk --save_chunk--> RawPayload(vM)
//!                      (key lock held)                (key lock held)
//! ```

use crate::config::TranslatorConfig;
use chunkform_concurrency::{KeyLock, KeyLockTable};
use chunkform_core::{Block, Error, FormatVersion, NamespacedId, RawPayload, Result};
use chunkform_durability::{FormatChain, FormatLink};
use chunkform_storage::{
    Biome3DComponent, BlockComponent, BlockEntityComponent, ComponentRegistry, EntityComponent,
    HeightmapComponent, UniversalChunk,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Identity of one chunk column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    /// Column x, in chunks
    pub cx: i32,
    /// Column z, in chunks
    pub cz: i32,
}

impl ChunkKey {
    /// Key for column `(cx, cz)`
    pub const fn new(cx: i32, cz: i32) -> Self {
        ChunkKey { cx, cz }
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.cx, self.cz)
    }
}

/// Versioned chunk translator
#[derive(Debug, Clone)]
pub struct Translator {
    config: TranslatorConfig,
    chain: Arc<FormatChain>,
    components: Arc<ComponentRegistry>,
    locks: KeyLockTable<ChunkKey>,
}

impl Translator {
    /// Build a translator over `links`, lowest version first
    ///
    /// The chain follows the configured gap and layout policy. Components
    /// load through [`ComponentRegistry::standard`].
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for an invalid config; [`Error::InvalidChain`] if
    /// the links do not form a valid chain.
    pub fn new(config: TranslatorConfig, links: impl IntoIterator<Item = FormatLink>) -> Result<Self> {
        config.validate()?;
        let chain = FormatChain::builder()
            .allow_gaps(config.allow_version_gaps)
            .strict_layout(config.strict_layout)
            .links(links)
            .build()?;
        info!(
            target: "chunkform::translator",
            universal = %chain.universal_version(),
            allow_version_gaps = config.allow_version_gaps,
            strict_layout = config.strict_layout,
            "Translator ready"
        );
        Ok(Translator {
            config,
            chain: Arc::new(chain),
            components: Arc::new(ComponentRegistry::standard()),
            locks: KeyLockTable::new(),
        })
    }

    /// Replace the component registry used by loads
    pub fn with_components(mut self, components: ComponentRegistry) -> Self {
        self.components = Arc::new(components);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// The built format chain
    pub fn chain(&self) -> &FormatChain {
        &self.chain
    }

    /// The component registry used by loads
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Lock for `key`, for read-modify-write sequences spanning several calls
    ///
    /// The lock is reentrant, so `load_chunk` / `save_chunk` may be called
    /// while holding it.
    pub fn lock(&self, key: ChunkKey) -> Arc<KeyLock<ChunkKey>> {
        self.locks.get(&key)
    }

    /// Decode `raw` and bring it to the universal model
    ///
    /// # Errors
    ///
    /// Anything the chain raises, plus [`Error::StructuralMismatch`] if a
    /// loaded block or biome component's section shape differs from the
    /// configured one.
    pub fn load_chunk(&self, key: ChunkKey, raw: &RawPayload) -> Result<UniversalChunk> {
        let lock = self.locks.get(&key);
        let _guard = lock.lock();
        let chunk = self.chain.to_universal(raw, &self.components)?;
        self.check_sections(&chunk)?;
        debug!(
            target: "chunkform::translator",
            %key,
            version = %raw.version,
            components = ?chunk.storage_keys(),
            "Chunk loaded"
        );
        Ok(chunk)
    }

    /// Encode `chunk` at `target`, writing only the components it persists
    pub fn save_chunk(&self, key: ChunkKey, chunk: &UniversalChunk, target: FormatVersion) -> Result<RawPayload> {
        let lock = self.locks.get(&key);
        let _guard = lock.lock();
        self.check_sections(chunk)?;
        let raw = self.chain.from_universal(chunk, target)?;
        debug!(
            target: "chunkform::translator",
            %key,
            version = %target,
            bytes = raw.bytes.len(),
            "Chunk saved"
        );
        Ok(raw)
    }

    /// Re-encode `raw` at `target` without building a universal chunk
    pub fn convert(&self, raw: &RawPayload, target: FormatVersion) -> Result<RawPayload> {
        let data = self.chain.decode(raw)?;
        let data = self.chain.translate(data, raw.version, target)?;
        self.chain.encode(&data, target)
    }

    /// Empty chunk with every standard component at the configured shapes
    pub fn create_chunk(&self, default_block: Block, default_biome: NamespacedId) -> Result<UniversalChunk> {
        let sections = &self.config.sections;
        let footprint = [sections.block_shape[0], sections.block_shape[2]];
        let mut chunk = UniversalChunk::new();
        chunk.insert(BlockComponent::new(sections.block_shape, default_block)?);
        chunk.insert(Biome3DComponent::new(sections.biome_shape, default_biome)?);
        chunk.insert(HeightmapComponent::new(footprint));
        chunk.insert(EntityComponent::new());
        chunk.insert(BlockEntityComponent::new(footprint));
        Ok(chunk)
    }

    fn check_sections(&self, chunk: &UniversalChunk) -> Result<()> {
        let sections = &self.config.sections;
        if let Some(blocks) = chunk.get::<BlockComponent>() {
            expect_shape("block", blocks.sections().array_shape(), sections.block_shape)?;
        }
        if let Some(biomes) = chunk.get::<Biome3DComponent>() {
            expect_shape("biome", biomes.sections().array_shape(), sections.biome_shape)?;
        }
        Ok(())
    }
}

fn expect_shape(what: &str, found: [usize; 3], configured: [usize; 3]) -> Result<()> {
    if found != configured {
        return Err(Error::mismatch(format!(
            "{} sections are {:?}, configured {:?}",
            what, found, configured
        )));
    }
    Ok(())
}
