//! The universal chunk
//!
//! A [`UniversalChunk`] is a map from storage key to component. Absence of a
//! key means the capability is unset for that chunk. The universal tree form
//! stores each component under its key; fields no registered component
//! claims are carried in the [`RawComponent`] and written back at the top
//! level.

use crate::component::{AnyComponent, BoxedValue, Component};
use crate::components::{
    Biome3DComponent, BlockComponent, BlockEntityComponent, EntityComponent, HeightmapComponent,
    RawComponent,
};
use chunkform_core::{Compound, Error, Result, Tag};
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::debug;

/// Decodes one component from its universal tag
pub type ComponentDecoder = fn(&Tag) -> Result<Box<dyn AnyComponent>>;

fn decode<C: Component>(tag: &Tag) -> Result<Box<dyn AnyComponent>> {
    Ok(Box::new(C::from_tag(tag)?))
}

static STANDARD_COMPONENTS: &[(&str, ComponentDecoder)] = &[
    (BlockComponent::STORAGE_KEY, decode::<BlockComponent>),
    (Biome3DComponent::STORAGE_KEY, decode::<Biome3DComponent>),
    (HeightmapComponent::STORAGE_KEY, decode::<HeightmapComponent>),
    (EntityComponent::STORAGE_KEY, decode::<EntityComponent>),
    (BlockEntityComponent::STORAGE_KEY, decode::<BlockEntityComponent>),
];

// =============================================================================
// ComponentRegistry
// =============================================================================

/// Storage key -> decoder table used when loading chunks
///
/// Populated explicitly: [`standard`](Self::standard) for the built-in
/// components, [`register`](Self::register) for host-defined ones.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    decoders: FxHashMap<&'static str, ComponentDecoder>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

impl ComponentRegistry {
    /// Registry with no components; every field loads as raw
    pub fn empty() -> Self {
        ComponentRegistry::default()
    }

    /// Registry with the standard components
    pub fn standard() -> Self {
        let mut registry = ComponentRegistry::empty();
        for &(key, decoder) in STANDARD_COMPONENTS {
            registry.decoders.insert(key, decoder);
        }
        registry
    }

    /// Register `C`, replacing any decoder already bound to its key
    ///
    /// The `raw` key is reserved and cannot be rebound.
    pub fn register<C: Component>(&mut self) -> Result<&mut Self> {
        if C::STORAGE_KEY == RawComponent::STORAGE_KEY {
            return Err(Error::mismatch("storage key 'raw' is reserved"));
        }
        self.decoders.insert(C::STORAGE_KEY, decode::<C>);
        Ok(self)
    }

    /// Whether `key` has a decoder
    pub fn contains(&self, key: &str) -> bool {
        self.decoders.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.decoders.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    fn decoder(&self, key: &str) -> Option<ComponentDecoder> {
        self.decoders.get(key).copied()
    }
}

// =============================================================================
// UniversalChunk
// =============================================================================

/// Version-agnostic chunk: storage key -> component
#[derive(Debug, Clone, Default)]
pub struct UniversalChunk {
    components: FxHashMap<&'static str, Box<dyn AnyComponent>>,
}

impl UniversalChunk {
    /// Chunk with no components
    pub fn new() -> Self {
        UniversalChunk::default()
    }

    /// Add `component`, returning the one it replaces
    pub fn insert<C: Component>(&mut self, component: C) -> Option<Box<dyn AnyComponent>> {
        self.components.insert(C::STORAGE_KEY, Box::new(component))
    }

    /// Add a type-erased component under its own storage key
    pub fn insert_boxed(&mut self, component: Box<dyn AnyComponent>) -> Option<Box<dyn AnyComponent>> {
        self.components.insert(component.storage_key(), component)
    }

    /// Component `C`, if present
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.components
            .get(C::STORAGE_KEY)?
            .as_any()
            .downcast_ref::<C>()
    }

    /// Mutable component `C`, if present
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .get_mut(C::STORAGE_KEY)?
            .as_any_mut()
            .downcast_mut::<C>()
    }

    /// Value of component `C`, if present
    pub fn value<C: Component>(&self) -> Option<&C::Value> {
        self.get::<C>().map(Component::get)
    }

    /// Component under `key`, type-erased
    pub fn get_dyn(&self, key: &str) -> Option<&dyn AnyComponent> {
        self.components.get(key).map(|c| c.as_ref())
    }

    /// Replace the value of component `C`
    ///
    /// # Errors
    ///
    /// [`Error::StructuralMismatch`] if the chunk has no `C`, or if the value
    /// does not fit its shape. The stored value is unchanged on error.
    pub fn set<C: Component>(&mut self, value: C::Value) -> Result<()> {
        match self.get_mut::<C>() {
            Some(component) => component.set(value),
            None => Err(missing(C::STORAGE_KEY)),
        }
    }

    /// Replace the value of the component under `key` from a type-erased box
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if the value is not the component's value type;
    /// [`Error::StructuralMismatch`] if the key is absent or the shape differs.
    pub fn set_boxed(&mut self, key: &str, value: BoxedValue) -> Result<()> {
        match self.components.get_mut(key) {
            Some(component) => component.set_boxed(value),
            None => Err(missing(key)),
        }
    }

    /// Remove the component under `key`
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn AnyComponent>> {
        self.components.remove(key)
    }

    /// Whether a component is stored under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.components.contains_key(key)
    }

    /// Storage keys present, sorted
    pub fn storage_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.components.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the chunk has no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    // =========================================================================
    // Universal tree form
    // =========================================================================

    /// Encode as the universal tree
    ///
    /// With `persisted` set, only the listed storage keys are written; raw
    /// fields are written when `raw` is listed. Components are written in
    /// key order followed by raw fields in their original order.
    pub fn to_compound(&self, persisted: Option<&[String]>) -> Compound {
        let wanted = |key: &str| persisted.map_or(true, |keys| keys.iter().any(|k| k == key));
        let mut root = Compound::new();
        for key in self.storage_keys() {
            if key == RawComponent::STORAGE_KEY || !wanted(key) {
                continue;
            }
            if let Some(component) = self.components.get(key) {
                root.insert(key, component.to_tag());
            }
        }
        if wanted(RawComponent::STORAGE_KEY) {
            if let Some(raw) = self.get::<RawComponent>() {
                for (key, tag) in raw.get().iter() {
                    if !root.contains_key(key) {
                        root.insert(key, tag.clone());
                    }
                }
            }
        }
        root
    }

    /// Decode the universal tree
    ///
    /// Keys with a registered decoder become components; every other field
    /// is kept verbatim in the raw component.
    pub fn from_compound(compound: &Compound, registry: &ComponentRegistry) -> Result<Self> {
        let mut chunk = UniversalChunk::new();
        let mut raw = RawComponent::default();
        for (key, tag) in compound.iter() {
            match registry.decoder(key) {
                Some(decoder) => {
                    chunk.insert_boxed(decoder(tag)?);
                }
                None => {
                    debug!(target: "chunkform::chunk", key, "Unclaimed field kept as raw");
                    raw.insert(key, tag.clone());
                }
            }
        }
        if !raw.get().is_empty() {
            chunk.insert(raw);
        }
        Ok(chunk)
    }
}

fn missing(key: &str) -> Error {
    Error::mismatch(format!(
        "no '{}' component to set; insert one first",
        key
    ))
}
