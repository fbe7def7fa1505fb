use crate::component::Component;
use crate::components::component_root;
use crate::section::{shape_from, shape_tag};
use chunkform_core::{Compound, Error, Namespaced, Result, Tag};
use std::collections::BTreeMap;

/// Data attached to a single block position
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEntity {
    namespace: String,
    base_name: String,
    data: Compound,
}

impl BlockEntity {
    /// Create a block entity
    pub fn new(namespace: impl Into<String>, base_name: impl Into<String>, data: Compound) -> Self {
        BlockEntity {
            namespace: namespace.into(),
            base_name: base_name.into(),
            data,
        }
    }

    /// Version-specific payload
    pub fn data(&self) -> &Compound {
        &self.data
    }
}

impl Namespaced for BlockEntity {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn base_name(&self) -> &str {
        &self.base_name
    }
}

/// Block entities keyed by column-local `(x, y, z)` (`be`)
///
/// `x` and `z` must lie inside the chunk footprint; `y` is unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEntityComponent {
    footprint: [usize; 2],
    entries: BTreeMap<[i64; 3], BlockEntity>,
}

impl BlockEntityComponent {
    /// No block entities; keys must fit `footprint` (`x`, `z`)
    pub fn new(footprint: [usize; 2]) -> Self {
        BlockEntityComponent {
            footprint,
            entries: BTreeMap::new(),
        }
    }

    /// Column footprint keys must fit
    pub fn footprint(&self) -> [usize; 2] {
        self.footprint
    }

    /// Block entity at `position`
    pub fn at(&self, position: [i64; 3]) -> Option<&BlockEntity> {
        self.entries.get(&position)
    }

    /// Place `entity` at `position`, returning any previous occupant
    pub fn insert(&mut self, position: [i64; 3], entity: BlockEntity) -> Result<Option<BlockEntity>> {
        self.check(position)?;
        Ok(self.entries.insert(position, entity))
    }

    /// Remove the block entity at `position`
    pub fn remove(&mut self, position: [i64; 3]) -> Option<BlockEntity> {
        self.entries.remove(&position)
    }

    /// Number of block entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are none
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check(&self, [x, y, z]: [i64; 3]) -> Result<()> {
        let inside = |v: i64, bound: usize| v >= 0 && (v as u64) < bound as u64;
        if inside(x, self.footprint[0]) && inside(z, self.footprint[1]) {
            Ok(())
        } else {
            Err(Error::mismatch(format!(
                "block entity at ({}, {}, {}) outside footprint {}x{}",
                x, y, z, self.footprint[0], self.footprint[1]
            )))
        }
    }
}

impl Component for BlockEntityComponent {
    const STORAGE_KEY: &'static str = "be";
    type Value = BTreeMap<[i64; 3], BlockEntity>;

    fn get(&self) -> &Self::Value {
        &self.entries
    }

    fn set(&mut self, value: Self::Value) -> Result<()> {
        value.keys().try_for_each(|&p| self.check(p))?;
        self.entries = value;
        Ok(())
    }

    fn to_tag(&self) -> Tag {
        let entries = self
            .entries
            .iter()
            .map(|([x, y, z], be)| {
                let mut entry = Compound::new();
                entry.insert("x", Tag::Long(*x));
                entry.insert("y", Tag::Long(*y));
                entry.insert("z", Tag::Long(*z));
                entry.insert("namespace", be.namespace.as_str());
                entry.insert("base_name", be.base_name.as_str());
                entry.insert("data", be.data.clone());
                Tag::Compound(entry)
            })
            .collect();
        let mut root = Compound::new();
        root.insert("footprint", shape_tag(&self.footprint));
        root.insert("entries", Tag::List(entries));
        Tag::Compound(root)
    }

    fn from_tag(tag: &Tag) -> Result<Self> {
        let root = component_root(Self::STORAGE_KEY, tag)?;
        let mut component = BlockEntityComponent::new(shape_from(root.require_int_array("footprint")?)?);
        for entry in root.require_list("entries")? {
            let entry = entry
                .as_compound()
                .ok_or_else(|| Error::mismatch("block entity entry is not a compound"))?;
            let position = [
                entry.require_i64("x")?,
                entry.require_i64("y")?,
                entry.require_i64("z")?,
            ];
            let be = BlockEntity::new(
                entry.require_str("namespace")?,
                entry.require_str("base_name")?,
                entry.require_compound("data")?.clone(),
            );
            if component.insert(position, be)?.is_some() {
                return Err(Error::mismatch(format!(
                    "two block entities at {:?}",
                    position
                )));
            }
        }
        Ok(component)
    }
}
