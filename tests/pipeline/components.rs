//! Component values inside a universal chunk.

use crate::common::*;
use chunkform::{
    Biome3DComponent, Block, BlockComponent, BlockComponentData, BoxedValue, ChunkKey, Component,
    ComponentRegistry, Compound, Error, FormatLink, FormatVersion, HeightmapComponent, NamespacedId,
    RawComponent, Result, SectionArrayMap, Tag, Translator, UniversalChunk,
};
use std::collections::BTreeMap;

#[test]
fn reshaping_set_fails_and_keeps_value() {
    let translator = world_translator();
    let mut chunk = translator
        .create_chunk(Block::new("core", "air"), NamespacedId::new("core", "plains"))
        .unwrap();
    chunk
        .get_mut::<BlockComponent>()
        .unwrap()
        .set_block(1, 1, 1, Block::new("core", "stone"))
        .unwrap();
    let before = chunk.value::<BlockComponent>().unwrap().clone();

    let mut reshaped = before.clone();
    reshaped.sections = SectionArrayMap::new([16, 16, 16], 0).unwrap();
    let err = chunk.set::<BlockComponent>(reshaped).unwrap_err();
    assert!(matches!(err, Error::StructuralMismatch(_)));
    assert_eq!(chunk.value::<BlockComponent>().unwrap(), &before);

    let mut heights = BTreeMap::new();
    heights.insert("surface".to_string(), vec![0i64; 3]);
    assert!(chunk.set::<HeightmapComponent>(heights).is_err());
    assert!(chunk.value::<HeightmapComponent>().unwrap().is_empty());
}

#[test]
fn same_shape_set_replaces_value() {
    let translator = world_translator();
    let mut chunk = translator
        .create_chunk(Block::new("core", "air"), NamespacedId::new("core", "plains"))
        .unwrap();

    let mut donor = BlockComponent::new([4, 4, 4], Block::new("core", "water")).unwrap();
    donor.set_block(0, 0, 0, Block::new("core", "sand")).unwrap();
    let value: BlockComponentData = donor.get().clone();

    chunk.set::<BlockComponent>(value).unwrap();
    let blocks = chunk.get::<BlockComponent>().unwrap();
    assert_eq!(blocks.block_at(0, 0, 0).unwrap(), &Block::new("core", "sand"));
    assert_eq!(blocks.block_at(3, -40, 3).unwrap(), &Block::new("core", "water"));
}

#[test]
fn boxed_set_checks_value_type() {
    let translator = world_translator();
    let mut chunk = translator
        .create_chunk(Block::new("core", "air"), NamespacedId::new("core", "plains"))
        .unwrap();

    let err = chunk
        .set_boxed(Biome3DComponent::STORAGE_KEY, BoxedValue::new(vec![1i64, 2, 3]))
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    assert!(matches!(
        UniversalChunk::new().set::<HeightmapComponent>(BTreeMap::new()),
        Err(Error::StructuralMismatch(_))
    ));
}

/// Light levels packed per column, stored by a plugin
#[derive(Debug, Clone, PartialEq)]
struct LightComponent {
    levels: Vec<i32>,
}

impl Component for LightComponent {
    const STORAGE_KEY: &'static str = "light";
    type Value = Vec<i32>;

    fn get(&self) -> &Vec<i32> {
        &self.levels
    }

    fn set(&mut self, value: Vec<i32>) -> Result<()> {
        if value.len() != self.levels.len() {
            return Err(Error::mismatch("light level count changed"));
        }
        self.levels = value;
        Ok(())
    }

    fn to_tag(&self) -> Tag {
        Tag::IntArray(self.levels.clone())
    }

    fn from_tag(tag: &Tag) -> Result<Self> {
        let levels = tag
            .as_int_array()
            .ok_or_else(|| Error::mismatch("light levels must be an int array"))?;
        Ok(LightComponent {
            levels: levels.to_vec(),
        })
    }
}

#[test]
fn plugin_components_load_once_registered() {
    let mut chunk = UniversalChunk::new();
    chunk.insert(LightComponent {
        levels: vec![15, 12, 0],
    });
    let mut extra = Compound::new();
    extra.insert("Status", Tag::from("full"));
    chunk.insert(RawComponent::new(extra));

    let links = || vec![FormatLink::new(1), FormatLink::new(2)];
    let plain = Translator::new(small_config(), links()).unwrap();
    let mut registry = ComponentRegistry::standard();
    registry.register::<LightComponent>().unwrap();
    let with_light = Translator::new(small_config(), links())
        .unwrap()
        .with_components(registry);

    let key = ChunkKey::new(9, 9);
    let raw = plain.save_chunk(key, &chunk, FormatVersion::new(2)).unwrap();

    let loaded = with_light.load_chunk(key, &raw).unwrap();
    assert_eq!(loaded.value::<LightComponent>(), Some(&vec![15, 12, 0]));

    // Without a decoder the field rides along untouched in the raw component.
    let unclaimed = plain.load_chunk(key, &raw).unwrap();
    assert!(unclaimed.get::<LightComponent>().is_none());
    assert_eq!(unclaimed.storage_keys(), ["raw"]);
    let reencoded = plain.save_chunk(key, &unclaimed, FormatVersion::new(2)).unwrap();
    assert_eq!(reencoded, raw);
}
