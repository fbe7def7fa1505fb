//! Load and save through the translator facade.

use crate::common::*;
use chunkform::{
    Biome3DComponent, Block, BlockComponent, BlockEntity, BlockEntityComponent, ChunkKey,
    Component, Compound, Entity, EntityComponent, Error, FormatVersion, HeightmapComponent,
    NamespacedId, PayloadCodec, RawComponent, RawPayload, SliceSpec, Tag, TagCodec, Translator,
    TranslatorConfig, UniversalChunk, CONFIG_FILE_NAME,
};
use tempfile::TempDir;

fn populated_chunk(translator: &Translator) -> UniversalChunk {
    let mut chunk = translator
        .create_chunk(Block::new("core", "air"), NamespacedId::new("core", "plains"))
        .unwrap();

    let blocks = chunk.get_mut::<BlockComponent>().unwrap();
    blocks.set_block(0, -3, 0, Block::new("core", "bedrock")).unwrap();
    blocks
        .set_block(2, 9, 1, "core:oak_log[axis=y]".parse().unwrap())
        .unwrap();

    chunk
        .get_mut::<Biome3DComponent>()
        .unwrap()
        .set_biome(1, 9, 1, NamespacedId::new("core", "forest"))
        .unwrap();

    let heights = chunk.get_mut::<HeightmapComponent>().unwrap();
    heights.set_map("surface", (0..16).collect()).unwrap();

    let mut data = Compound::new();
    data.insert("Health", Tag::Float(20.0));
    chunk
        .get_mut::<EntityComponent>()
        .unwrap()
        .push(Entity::new("core", "sheep", [1.5, 65.0, 2.25], data))
        .unwrap();

    let mut chest = Compound::new();
    chest.insert("Items", Tag::List(Vec::new()));
    chunk
        .get_mut::<BlockEntityComponent>()
        .unwrap()
        .insert([3, 9, 0], BlockEntity::new("core", "chest", chest))
        .unwrap();

    let mut raw = RawComponent::default();
    raw.insert("Status", Tag::from("full"));
    raw.insert("LastUpdate", Tag::Long(12_345));
    chunk.insert(raw);
    chunk
}

#[test]
fn universal_round_trip_keeps_everything() {
    let translator = world_translator();
    let chunk = populated_chunk(&translator);
    let key = ChunkKey::new(4, -7);

    let raw = translator.save_chunk(key, &chunk, FormatVersion::new(3)).unwrap();
    let loaded = translator.load_chunk(key, &raw).unwrap();

    assert_eq!(loaded.storage_keys(), ["b3d", "be", "bl", "e", "hm", "raw"]);
    assert_eq!(
        loaded.get::<BlockComponent>().unwrap().get(),
        chunk.get::<BlockComponent>().unwrap().get()
    );
    assert_eq!(loaded.value::<EntityComponent>(), chunk.value::<EntityComponent>());
    assert_eq!(
        loaded.value::<BlockEntityComponent>(),
        chunk.value::<BlockEntityComponent>()
    );
    assert_eq!(loaded.value::<RawComponent>(), chunk.value::<RawComponent>());
}

#[test]
fn older_versions_persist_only_their_components() {
    let translator = world_translator();
    let chunk = populated_chunk(&translator);
    let key = ChunkKey::new(0, 0);

    let v1 = translator.save_chunk(key, &chunk, FormatVersion::new(1)).unwrap();
    let on_disk = TagCodec.decode(&v1.bytes).unwrap();
    assert!(on_disk.contains_key("Blocks"));
    assert!(on_disk.contains_key("Biomes"));
    assert!(!on_disk.contains_key("e"));
    assert_eq!(on_disk.get("Status"), Some(&Tag::from("full")));

    let loaded = translator.load_chunk(key, &v1).unwrap();
    assert!(loaded.get::<EntityComponent>().is_none());
    assert!(loaded.get::<BlockEntityComponent>().is_none());

    let blocks = loaded.get::<BlockComponent>().unwrap();
    assert_eq!(blocks.block_at(0, -3, 0).unwrap(), &Block::new("core", "bedrock"));
    assert_eq!(
        blocks.block_at(2, 9, 1).unwrap().to_string(),
        "core:oak_log[axis=y]"
    );
    assert_eq!(blocks.block_at(3, 100, 3).unwrap(), &Block::new("core", "air"));
    assert_eq!(
        loaded
            .get::<Biome3DComponent>()
            .unwrap()
            .biome_at(1, 9, 1)
            .unwrap(),
        &NamespacedId::new("core", "forest")
    );
}

#[test]
fn convert_matches_save_at_target() {
    let translator = world_translator();
    let chunk = populated_chunk(&translator);
    let key = ChunkKey::new(1, 1);

    let v3 = translator.save_chunk(key, &chunk, FormatVersion::new(3)).unwrap();
    let v2 = translator.convert(&v3, FormatVersion::new(2)).unwrap();
    assert_eq!(v2, translator.save_chunk(key, &chunk, FormatVersion::new(2)).unwrap());

    let back = translator.convert(&v2, FormatVersion::new(3)).unwrap();
    assert_eq!(back, v3);
}

#[test]
fn heightmap_windows_survive_reload() {
    let translator = world_translator();
    let chunk = populated_chunk(&translator);
    let key = ChunkKey::new(2, 2);

    let raw = translator.save_chunk(key, &chunk, FormatVersion::new(2)).unwrap();
    let mut loaded = translator.load_chunk(key, &raw).unwrap();
    let heights = loaded.get_mut::<HeightmapComponent>().unwrap();

    let column = heights
        .view("surface", [SliceSpec::index(1), SliceSpec::reversed()])
        .unwrap();
    assert_eq!(column.to_vec(), vec![7, 6, 5, 4]);

    heights
        .view_mut("surface", [SliceSpec::stepped(0, 4, 2), SliceSpec::range(0, 1)])
        .unwrap()
        .fill(-64);
    assert_eq!(&heights.map("surface").unwrap()[..9], &[-64, 1, 2, 3, 4, 5, 6, 7, -64]);
}

#[test]
fn unknown_version_and_garbage_are_rejected() {
    let translator = world_translator();
    let key = ChunkKey::new(0, 0);

    let err = translator
        .load_chunk(key, &RawPayload::new(7u32, Vec::new()))
        .unwrap_err();
    assert_eq!(err, Error::UnsupportedVersion(FormatVersion::new(7)));

    let err = translator
        .load_chunk(key, &RawPayload::new(3u32, vec![10, 0, 1]))
        .unwrap_err();
    assert!(matches!(err, Error::StructuralMismatch(_)));

    let chunk = translator
        .create_chunk(Block::new("core", "air"), NamespacedId::new("core", "plains"))
        .unwrap();
    assert!(translator
        .save_chunk(key, &chunk, FormatVersion::new(4))
        .is_err());
}

#[test]
fn translator_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    small_config().write_to_file(&path).unwrap();

    let config = TranslatorConfig::from_file(&path).unwrap();
    let translator = Translator::new(config, world_links()).unwrap();
    let chunk = translator
        .create_chunk(Block::new("core", "air"), NamespacedId::new("core", "plains"))
        .unwrap();
    assert_eq!(
        chunk.get::<BlockComponent>().unwrap().sections().array_shape(),
        [4, 4, 4]
    );

    // A translator configured for full-size sections refuses the small ones.
    let default = Translator::new(TranslatorConfig::default(), world_links()).unwrap();
    let raw = translator
        .save_chunk(ChunkKey::new(0, 0), &chunk, FormatVersion::new(3))
        .unwrap();
    assert!(matches!(
        default.load_chunk(ChunkKey::new(0, 0), &raw),
        Err(Error::StructuralMismatch(_))
    ));
}
