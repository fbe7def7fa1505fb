//! Bidirectional identifier registry
//!
//! Maps stable namespaced identities to compact numeric codes and back.
//! On-disk palettes store the numeric codes; the namespaced identity is what
//! survives across versions and sessions.
//!
//! ## Usage
//!
//! ```rust
//! use chunkform_core::{IdentifierRegistry, NamespacedId};
//!
//! let mut registry = IdentifierRegistry::new();
//! registry.register(7, NamespacedId::new("core", "stone")).unwrap();
//!
//! assert_eq!(registry.numerical_id_to_namespace_id(7).unwrap().to_string(), "core:stone");
//! assert_eq!(registry.namespace_id_to_numerical_id("core", "stone").unwrap(), 7);
//! ```
//!
//! ## Invariants
//!
//! - The numeric → name and name → numeric maps always describe the same entry set
//! - No two entries share a numeric id or a namespaced id
//! - A failed registration changes nothing
//!
//! Mutation takes `&mut self`; callers sharing a registry across threads wrap
//! it in a lock and serialize registrations (typically a one-time palette load).

use crate::error::{Error, Result};
use crate::types::NamespacedId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One persisted registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Numeric code
    pub id: u32,
    /// Namespace part of the identity
    pub namespace: String,
    /// Base name part of the identity
    pub base_name: String,
}

/// Registry of `numeric id <-> namespaced id` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierRegistry {
    /// Names by numeric id
    by_numeric: FxHashMap<u32, NamespacedId>,
    /// Numeric ids by name
    by_name: FxHashMap<NamespacedId, u32>,
}

impl IdentifierRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        IdentifierRegistry {
            by_numeric: FxHashMap::default(),
            by_name: FxHashMap::default(),
        }
    }

    /// Register a pair
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateRegistration`] if either `id` or `name` is already
    /// registered. Neither map is modified in that case.
    pub fn register(&mut self, id: u32, name: NamespacedId) -> Result<()> {
        if self.by_numeric.contains_key(&id) || self.by_name.contains_key(&name) {
            return Err(Error::DuplicateRegistration {
                id,
                name: name.to_string(),
            });
        }
        self.by_name.insert(name.clone(), id);
        self.by_numeric.insert(id, name);
        Ok(())
    }

    /// Return the id for `name`, registering it under the next free id if absent
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] if every numeric id is taken. Nothing is
    /// registered in that case.
    pub fn get_or_register(&mut self, name: NamespacedId) -> Result<u32> {
        if let Some(&id) = self.by_name.get(&name) {
            return Ok(id);
        }
        let id = self.next_free_id()?;
        self.by_name.insert(name.clone(), id);
        self.by_numeric.insert(id, name);
        Ok(id)
    }

    fn next_free_id(&self) -> Result<u32> {
        match self.by_numeric.keys().max() {
            Some(&max) if max < u32::MAX => Ok(max + 1),
            // u32::MAX is taken; scan for a hole below it.
            Some(_) => self.first_free_in(0..u32::MAX),
            None => Ok(0),
        }
    }

    fn first_free_in(&self, mut candidates: std::ops::Range<u32>) -> Result<u32> {
        candidates
            .find(|id| !self.by_numeric.contains_key(id))
            .ok_or_else(|| Error::InvalidIdentifier("numeric id space exhausted".to_string()))
    }

    /// Look up the name for a numeric id
    ///
    /// # Errors
    ///
    /// [`Error::MissingRegistration`] if `id` is not registered.
    pub fn numerical_id_to_namespace_id(&self, id: u32) -> Result<&NamespacedId> {
        self.by_numeric
            .get(&id)
            .ok_or_else(|| Error::MissingRegistration(format!("numeric id {}", id)))
    }

    /// Look up the numeric id for a name
    ///
    /// # Errors
    ///
    /// [`Error::MissingRegistration`] if the name is not registered.
    pub fn namespace_id_to_numerical_id(&self, namespace: &str, base_name: &str) -> Result<u32> {
        self.id_of(&NamespacedId::new(namespace, base_name))
    }

    /// Look up the numeric id for a name
    pub fn id_of(&self, name: &NamespacedId) -> Result<u32> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingRegistration(name.to_string()))
    }

    /// Whether the numeric id is registered
    pub fn contains_id(&self, id: u32) -> bool {
        self.by_numeric.contains_key(&id)
    }

    /// Whether the name is registered
    pub fn contains_name(&self, name: &NamespacedId) -> bool {
        self.by_name.contains_key(name)
    }

    /// All registered numeric ids, in no particular order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_numeric.keys().copied()
    }

    /// All entries, sorted by numeric id
    pub fn entries(&self) -> Vec<RegistryEntry> {
        let mut entries: Vec<RegistryEntry> = self
            .by_numeric
            .iter()
            .map(|(&id, name)| RegistryEntry {
                id,
                namespace: name.namespace().to_string(),
                base_name: name.base_name().to_string(),
            })
            .collect();
        entries.sort_by_key(|e| e.id);
        entries
    }

    /// Build a registry from persisted entries, enforcing the bijection
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Result<Self> {
        let mut registry = IdentifierRegistry::new();
        for entry in entries {
            registry.register(entry.id, NamespacedId::new(entry.namespace, entry.base_name))?;
        }
        Ok(registry)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.by_numeric.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.by_numeric.is_empty()
    }
}

impl Serialize for IdentifierRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries())
    }
}

impl<'de> Deserialize<'de> for IdentifierRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = Vec::<RegistryEntry>::deserialize(deserializer)?;
        IdentifierRegistry::from_entries(entries).map_err(serde::de::Error::custom)
    }
}
