use crate::component::Component;
use crate::components::component_root;
use crate::section::SectionArrayMap;
use chunkform_core::{Compound, Error, IdentifierRegistry, NamespacedId, RegistryEntry, Result, Tag};

/// Biome registry plus sectioned biome ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Biome3DData {
    /// Numeric id <-> biome identity
    pub palette: IdentifierRegistry,
    /// Per-section biome ids
    pub sections: SectionArrayMap,
}

/// Volumetric biome storage (`b3d`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Biome3DComponent {
    data: Biome3DData,
}

impl Biome3DComponent {
    /// Empty biome storage; unwritten cells read as `default_biome`
    pub fn new(array_shape: [usize; 3], default_biome: NamespacedId) -> Result<Self> {
        let mut palette = IdentifierRegistry::new();
        let default = palette.get_or_register(default_biome)?;
        Ok(Biome3DComponent {
            data: Biome3DData {
                palette,
                sections: SectionArrayMap::new(array_shape, default)?,
            },
        })
    }

    /// The biome registry
    pub fn palette(&self) -> &IdentifierRegistry {
        &self.data.palette
    }

    /// The sectioned biome ids
    pub fn sections(&self) -> &SectionArrayMap {
        &self.data.sections
    }

    /// Mutable biome ids. Section shapes stay enforced.
    pub fn sections_mut(&mut self) -> &mut SectionArrayMap {
        &mut self.data.sections
    }

    /// Biome at cell `(x, y, z)` in biome-grid coordinates
    pub fn biome_at(&self, x: usize, y: i64, z: usize) -> Result<&NamespacedId> {
        let id = self.data.sections.get_at(x, y, z)?;
        self.data.palette.numerical_id_to_namespace_id(id)
    }

    /// Set the biome at cell `(x, y, z)`, registering it if new
    pub fn set_biome(&mut self, x: usize, y: i64, z: usize, biome: NamespacedId) -> Result<()> {
        self.data.sections.get_at(x, y, z)?;
        let id = self.data.palette.get_or_register(biome)?;
        self.data.sections.set_at(x, y, z, id)
    }

    fn validate(&self, value: &Biome3DData) -> Result<()> {
        let (have, got) = (self.data.sections.array_shape(), value.sections.array_shape());
        if have != got {
            return Err(Error::mismatch(format!(
                "biome sections have shape {:?}, cannot set {:?}",
                have, got
            )));
        }
        let default = value.sections.default_value();
        if !value.palette.contains_id(default) {
            return Err(Error::mismatch(format!(
                "default biome id {} is not registered",
                default
            )));
        }
        for (cy, section) in value.sections.sections() {
            if let Some(&bad) = section
                .as_slice()
                .iter()
                .find(|&&id| !value.palette.contains_id(id))
            {
                return Err(Error::mismatch(format!(
                    "section {} references unregistered biome id {}",
                    cy, bad
                )));
            }
        }
        Ok(())
    }
}

impl Component for Biome3DComponent {
    const STORAGE_KEY: &'static str = "b3d";
    type Value = Biome3DData;

    fn get(&self) -> &Biome3DData {
        &self.data
    }

    fn set(&mut self, value: Biome3DData) -> Result<()> {
        self.validate(&value)?;
        self.data = value;
        Ok(())
    }

    fn to_tag(&self) -> Tag {
        let palette = self
            .data
            .palette
            .entries()
            .into_iter()
            .map(|e| {
                let mut entry = Compound::new();
                entry.insert("id", Tag::Long(e.id as i64));
                entry.insert("namespace", e.namespace);
                entry.insert("base_name", e.base_name);
                Tag::Compound(entry)
            })
            .collect();
        let mut root = Compound::new();
        root.insert("palette", Tag::List(palette));
        root.insert("sections", self.data.sections.to_tag());
        Tag::Compound(root)
    }

    fn from_tag(tag: &Tag) -> Result<Self> {
        let root = component_root(Self::STORAGE_KEY, tag)?;
        let entries = root
            .require_list("palette")?
            .iter()
            .map(|t| {
                let entry = t
                    .as_compound()
                    .ok_or_else(|| Error::mismatch("biome palette entry is not a compound"))?;
                Ok(RegistryEntry {
                    id: u32::try_from(entry.require_i64("id")?)
                        .map_err(|_| Error::mismatch("biome id out of range"))?,
                    namespace: entry.require_str("namespace")?.to_string(),
                    base_name: entry.require_str("base_name")?.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let component = Biome3DComponent {
            data: Biome3DData {
                palette: IdentifierRegistry::from_entries(entries)?,
                sections: SectionArrayMap::from_tag(root.require("sections")?)?,
            },
        };
        component.validate(&component.data)?;
        Ok(component)
    }
}
