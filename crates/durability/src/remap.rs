//! Numeric id remapping between identifier registries
//!
//! Two versions often number the same namespaced identities differently.
//! Remapping translates numeric ids through the shared namespaced identity:
//! `id --from--> namespace:base_name --to--> id'`.

use chunkform_core::{Error, IdentifierRegistry, Result};
use chunkform_storage::SectionArrayMap;
use rustc_hash::FxHashMap;

/// Per-id translation table, built lazily
struct Translation<'a> {
    from: &'a IdentifierRegistry,
    to: &'a IdentifierRegistry,
    cache: FxHashMap<u32, u32>,
}

impl<'a> Translation<'a> {
    fn new(from: &'a IdentifierRegistry, to: &'a IdentifierRegistry) -> Self {
        Translation {
            from,
            to,
            cache: FxHashMap::default(),
        }
    }

    fn map(&mut self, id: u32) -> Result<u32> {
        if let Some(&mapped) = self.cache.get(&id) {
            return Ok(mapped);
        }
        let name = self.from.numerical_id_to_namespace_id(id)?;
        let mapped = self.to.id_of(name).map_err(|_| {
            Error::MissingRegistration(format!("{} (id {}) has no id in the target registry", name, id))
        })?;
        self.cache.insert(id, mapped);
        Ok(mapped)
    }
}

/// Rewrite `ids` from `from`'s numbering to `to`'s
///
/// # Errors
///
/// [`Error::MissingRegistration`] if an id is unknown to `from` or its
/// identity is unknown to `to`. `ids` is left untouched in that case.
pub fn remap_ids(ids: &mut [u32], from: &IdentifierRegistry, to: &IdentifierRegistry) -> Result<()> {
    let mut translation = Translation::new(from, to);
    let mapped = ids
        .iter()
        .map(|&id| translation.map(id))
        .collect::<Result<Vec<_>>>()?;
    ids.copy_from_slice(&mapped);
    Ok(())
}

/// Rewrite every section and the default value of `sections`
///
/// All-or-nothing like [`remap_ids`].
pub fn remap_sections(
    sections: &mut SectionArrayMap,
    from: &IdentifierRegistry,
    to: &IdentifierRegistry,
) -> Result<()> {
    let mut translation = Translation::new(from, to);
    let mut remapped = SectionArrayMap::new(
        sections.array_shape(),
        translation.map(sections.default_value())?,
    )?;
    for (cy, section) in sections.sections() {
        let mut section = section.clone();
        for id in section.as_mut_slice() {
            *id = translation.map(*id)?;
        }
        remapped.set_section(cy, section)?;
    }
    *sections = remapped;
    Ok(())
}
