//! Format version chain
//!
//! An ordered list of [`FormatLink`]s, lowest version first. The first link
//! is the root; the last is the universal version, whose tree stores
//! components under their storage keys.
//!
//! # Walking the chain
//!
//! ```text
//!   v1 ──upgrade(v2)──▶ v2 ──upgrade(v3)──▶ v3 (universal)
//!   v1 ◀─downgrade(v2)─ v2 ◀─downgrade(v3)─ v3
//! ```
//!
//! The upgrade delta of link `n` maps `n-1` to `n`; its downgrade delta maps
//! `n` back to `n-1`. Translation applies one delta per step and aborts on
//! the first failure without returning partially translated data.

use super::layout::Layout;
use super::link::{Delta, FormatLink};
use crate::codec::{PayloadCodec, TagCodec};
use chunkform_core::{Error, FormatVersion, RawPayload, Result, VersionedData};
use chunkform_storage::{ComponentRegistry, UniversalChunk};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

// =============================================================================
// ResolvedLink
// =============================================================================

/// A link with inherited settings filled in
#[derive(Clone)]
pub struct ResolvedLink {
    version: FormatVersion,
    codec: Arc<dyn PayloadCodec>,
    layout: Arc<Layout>,
    components: Option<Arc<[String]>>,
    upgrade: Option<Delta>,
    downgrade: Option<Delta>,
}

impl ResolvedLink {
    /// Version of the link
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Effective codec
    pub fn codec(&self) -> &dyn PayloadCodec {
        self.codec.as_ref()
    }

    /// Effective layout
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Effective persisted components; `None` persists every component
    pub fn components(&self) -> Option<&[String]> {
        self.components.as_deref()
    }

    /// Whether the link declares an upgrade delta
    pub fn has_upgrade(&self) -> bool {
        self.upgrade.is_some()
    }

    /// Whether the link declares a downgrade delta
    pub fn has_downgrade(&self) -> bool {
        self.downgrade.is_some()
    }
}

impl fmt::Debug for ResolvedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedLink")
            .field("version", &self.version)
            .field("codec", &self.codec.codec_id())
            .field("layout", &self.layout)
            .field("components", &self.components)
            .field("upgrade", &self.upgrade.is_some())
            .field("downgrade", &self.downgrade.is_some())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`FormatChain`]
#[derive(Debug, Default)]
pub struct FormatChainBuilder {
    links: Vec<FormatLink>,
    allow_gaps: bool,
    lenient_layout: bool,
}

impl FormatChainBuilder {
    /// Accept versions that are increasing but not consecutive
    pub fn allow_gaps(mut self, allow: bool) -> Self {
        self.allow_gaps = allow;
        self
    }

    /// Validate layouts on decode and encode (default: true)
    pub fn strict_layout(mut self, strict: bool) -> Self {
        self.lenient_layout = !strict;
        self
    }

    /// Append the next link
    pub fn link(mut self, link: FormatLink) -> Self {
        self.links.push(link);
        self
    }

    /// Append several links in order
    pub fn links(mut self, links: impl IntoIterator<Item = FormatLink>) -> Self {
        self.links.extend(links);
        self
    }

    /// Check ordering and resolve inheritance
    ///
    /// # Errors
    ///
    /// [`Error::InvalidChain`] if the chain is empty, a version does not
    /// strictly increase, a gap appears while gaps are not allowed, or the
    /// root declares a delta (it has no predecessor).
    pub fn build(self) -> Result<FormatChain> {
        let first = self
            .links
            .first()
            .ok_or_else(|| Error::InvalidChain("chain has no links".to_string()))?;
        if first.upgrade.is_some() || first.downgrade.is_some() {
            return Err(Error::InvalidChain(format!(
                "root link {} cannot declare deltas",
                first.version
            )));
        }
        for pair in self.links.windows(2) {
            let (prev, next) = (pair[0].version, pair[1].version);
            if next <= prev {
                return Err(Error::InvalidChain(format!(
                    "{} follows {}; versions must strictly increase",
                    next, prev
                )));
            }
            if !self.allow_gaps && prev.next() != Some(next) {
                return Err(Error::InvalidChain(format!(
                    "gap between {} and {}",
                    prev, next
                )));
            }
        }

        let mut resolved: Vec<ResolvedLink> = Vec::with_capacity(self.links.len());
        for link in self.links {
            let parent = resolved.last();
            let codec: Arc<dyn PayloadCodec> = match (link.codec, parent) {
                (Some(codec), _) => codec,
                (None, Some(p)) => Arc::clone(&p.codec),
                (None, None) => Arc::new(TagCodec),
            };
            let layout = match (link.layout, parent) {
                (Some(layout), _) => Arc::new(layout),
                (None, Some(p)) => Arc::clone(&p.layout),
                (None, None) => Arc::new(Layout::new()),
            };
            let components = match (link.components, parent) {
                (Some(keys), _) => Some(Arc::from(keys)),
                (None, Some(p)) => p.components.clone(),
                (None, None) => None,
            };
            resolved.push(ResolvedLink {
                version: link.version,
                codec,
                layout,
                components,
                upgrade: link.upgrade,
                downgrade: link.downgrade,
            });
        }

        let chain = FormatChain {
            links: resolved,
            strict_layout: !self.lenient_layout,
        };
        info!(
            target: "chunkform::chain",
            links = chain.links.len(),
            root = %chain.root_version(),
            universal = %chain.universal_version(),
            "Format chain built"
        );
        Ok(chain)
    }
}

// =============================================================================
// FormatChain
// =============================================================================

/// Immutable, ordered chain of resolved format links
#[derive(Debug, Clone)]
pub struct FormatChain {
    // never empty; versions strictly increasing
    links: Vec<ResolvedLink>,
    strict_layout: bool,
}

impl FormatChain {
    /// Start building a chain
    pub fn builder() -> FormatChainBuilder {
        FormatChainBuilder::default()
    }

    /// Registered versions, ascending
    pub fn versions(&self) -> Vec<FormatVersion> {
        self.links.iter().map(|l| l.version).collect()
    }

    /// Lowest registered version
    pub fn root_version(&self) -> FormatVersion {
        self.links[0].version
    }

    /// Highest registered version; its tree is the universal form
    pub fn universal_version(&self) -> FormatVersion {
        self.links[self.links.len() - 1].version
    }

    /// Whether `version` is registered
    pub fn contains(&self, version: FormatVersion) -> bool {
        self.position(version).is_ok()
    }

    /// Resolved link for `version`
    pub fn link(&self, version: FormatVersion) -> Option<&ResolvedLink> {
        self.position(version).ok().map(|i| &self.links[i])
    }

    /// Number of links
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always false; a built chain has at least one link
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Whether layouts are validated on decode and encode
    pub fn strict_layout(&self) -> bool {
        self.strict_layout
    }

    fn position(&self, version: FormatVersion) -> std::result::Result<usize, usize> {
        self.links.binary_search_by_key(&version, |l| l.version)
    }

    fn index_of(&self, version: FormatVersion) -> Result<usize> {
        self.position(version).map_err(|_| {
            warn!(target: "chunkform::chain", %version, "Unsupported format version");
            Error::UnsupportedVersion(version)
        })
    }

    fn check_version(data: &VersionedData, expected: FormatVersion) -> Result<()> {
        if data.version != expected {
            return Err(Error::mismatch(format!(
                "data is at {}, caller says {}",
                data.version, expected
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Codec boundary
    // =========================================================================

    /// Decode a raw payload with its version's codec and validate the layout
    pub fn decode(&self, raw: &RawPayload) -> Result<VersionedData> {
        let link = &self.links[self.index_of(raw.version)?];
        let root = link.codec.decode(&raw.bytes)?;
        if self.strict_layout {
            link.layout.validate(&root)?;
        }
        debug!(
            target: "chunkform::chain",
            version = %raw.version,
            bytes = raw.bytes.len(),
            fields = root.len(),
            "Decoded payload"
        );
        Ok(VersionedData::new(raw.version, root))
    }

    /// Encode `data` at `version`, validating the layout first
    pub fn encode(&self, data: &VersionedData, version: FormatVersion) -> Result<RawPayload> {
        let link = &self.links[self.index_of(version)?];
        Self::check_version(data, version)?;
        if self.strict_layout {
            link.layout.validate(&data.root)?;
        }
        Ok(RawPayload::new(version, link.codec.encode(&data.root)?))
    }

    // =========================================================================
    // Deltas
    // =========================================================================

    /// Apply the upgrade delta of the link directly above `from`
    pub fn upgrade(&self, data: VersionedData, from: FormatVersion) -> Result<VersionedData> {
        let index = self.index_of(from)?;
        Self::check_version(&data, from)?;
        self.step_up(data, index)
    }

    /// Apply the downgrade delta of the link at `from`
    pub fn downgrade(&self, data: VersionedData, from: FormatVersion) -> Result<VersionedData> {
        let index = self.index_of(from)?;
        Self::check_version(&data, from)?;
        self.step_down(data, index)
    }

    fn step_up(&self, mut data: VersionedData, index: usize) -> Result<VersionedData> {
        let next = self.links.get(index + 1).ok_or_else(|| {
            Error::mismatch(format!(
                "{} is the universal version; nothing above it",
                self.links[index].version
            ))
        })?;
        if let Some(delta) = &next.upgrade {
            delta(&mut data.root)?;
        }
        data.version = next.version;
        Ok(data)
    }

    fn step_down(&self, mut data: VersionedData, index: usize) -> Result<VersionedData> {
        if index == 0 {
            return Err(Error::mismatch(format!(
                "{} is the root version; nothing below it",
                self.links[0].version
            )));
        }
        if let Some(delta) = &self.links[index].downgrade {
            delta(&mut data.root)?;
        }
        data.version = self.links[index - 1].version;
        Ok(data)
    }

    /// Walk `data` from `from` to `to`, one link at a time
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedVersion`] if either endpoint is unregistered
    /// - [`Error::StructuralMismatch`] if `data` is not at `from`
    /// - whatever a delta returns; the walk stops there and `data` is dropped
    pub fn translate(
        &self,
        data: VersionedData,
        from: FormatVersion,
        to: FormatVersion,
    ) -> Result<VersionedData> {
        let start = self.index_of(from)?;
        let end = self.index_of(to)?;
        Self::check_version(&data, from)?;
        if start == end {
            return Ok(data);
        }
        debug!(target: "chunkform::chain", %from, %to, steps = start.abs_diff(end), "Translating");
        let mut data = data;
        if start < end {
            for index in start..end {
                data = self.step_up(data, index)?;
            }
        } else {
            for index in (end + 1..=start).rev() {
                data = self.step_down(data, index)?;
            }
        }
        Ok(data)
    }

    // =========================================================================
    // Full pipeline
    // =========================================================================

    /// Decode `raw`, translate it to the universal version and load components
    pub fn to_universal(&self, raw: &RawPayload, registry: &ComponentRegistry) -> Result<UniversalChunk> {
        let data = self.decode(raw)?;
        let data = self.translate(data, raw.version, self.universal_version())?;
        UniversalChunk::from_compound(&data.root, registry)
    }

    /// Write the components `target` persists, translate down and encode
    pub fn from_universal(&self, chunk: &UniversalChunk, target: FormatVersion) -> Result<RawPayload> {
        let link = &self.links[self.index_of(target)?];
        let universal = self.universal_version();
        let root = chunk.to_compound(link.components.as_deref());
        let data = self.translate(VersionedData::new(universal, root), universal, target)?;
        self.encode(&data, target)
    }
}
