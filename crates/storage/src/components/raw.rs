use crate::component::Component;
use crate::components::component_root;
use chunkform_core::{Compound, Result, Tag};

/// Universal fields no registered component claims, kept verbatim
///
/// When a chunk is written back, these entries are merged into the top
/// level of the universal tree in their original order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawComponent {
    fields: Compound,
}

impl RawComponent {
    /// Wrap unclaimed fields
    pub fn new(fields: Compound) -> Self {
        RawComponent { fields }
    }

    /// Keep one more unclaimed field
    pub fn insert(&mut self, key: impl Into<String>, value: Tag) {
        self.fields.insert(key, value);
    }
}

impl Component for RawComponent {
    const STORAGE_KEY: &'static str = "raw";
    type Value = Compound;

    fn get(&self) -> &Compound {
        &self.fields
    }

    fn set(&mut self, value: Compound) -> Result<()> {
        self.fields = value;
        Ok(())
    }

    fn to_tag(&self) -> Tag {
        Tag::Compound(self.fields.clone())
    }

    fn from_tag(tag: &Tag) -> Result<Self> {
        Ok(RawComponent::new(component_root(Self::STORAGE_KEY, tag)?.clone()))
    }
}
