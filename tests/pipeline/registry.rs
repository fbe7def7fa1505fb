//! Identifier registries shared between loaders.

use chunkform::{
    remap_sections, Biome3DComponent, Component, Error, IdentifierRegistry, NamespacedId,
};
use parking_lot::RwLock;
use std::sync::{Arc, Barrier};
use std::thread;

fn stone() -> NamespacedId {
    NamespacedId::new("core", "stone")
}

#[test]
fn register_and_look_up_both_ways() {
    let mut registry = IdentifierRegistry::new();
    registry.register(7, stone()).unwrap();

    assert_eq!(registry.numerical_id_to_namespace_id(7).unwrap(), &stone());
    assert_eq!(registry.namespace_id_to_numerical_id("core", "stone").unwrap(), 7);

    assert!(matches!(
        registry.register(7, NamespacedId::new("core", "dirt")),
        Err(Error::DuplicateRegistration { id: 7, .. })
    ));
    assert!(matches!(
        registry.register(8, stone()),
        Err(Error::DuplicateRegistration { id: 8, .. })
    ));
    assert_eq!(registry.len(), 1);
    assert!(!registry.contains_id(8));
}

#[test]
fn concurrent_loaders_agree_on_ids() {
    let registry = Arc::new(RwLock::new(IdentifierRegistry::new()));
    let names: Vec<NamespacedId> = ["stone", "dirt", "grass_block", "sand", "gravel", "water"]
        .iter()
        .map(|name| NamespacedId::new("core", *name))
        .collect();
    let threads = 6;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            let mut names = names.clone();
            names.rotate_left(t);
            thread::spawn(move || {
                barrier.wait();
                names
                    .into_iter()
                    .map(|name| {
                        if let Ok(id) = registry.read().id_of(&name) {
                            return (name, id);
                        }
                        let id = registry.write().get_or_register(name.clone()).unwrap();
                        (name, id)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let registry = registry.read();
    assert_eq!(registry.len(), names.len());
    for handle in handles {
        for (name, id) in handle.join().unwrap() {
            assert_eq!(registry.id_of(&name).unwrap(), id);
        }
    }
}

#[test]
fn registry_persists_as_json_entries() {
    let mut registry = IdentifierRegistry::new();
    registry.register(1, stone()).unwrap();
    registry.register(4, NamespacedId::new("mod", "ore")).unwrap();

    let json = serde_json::to_string(&registry).unwrap();
    let restored: IdentifierRegistry = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, registry);

    let clashing = r#"[{"id":1,"namespace":"core","base_name":"stone"},
                       {"id":2,"namespace":"core","base_name":"stone"}]"#;
    assert!(serde_json::from_str::<IdentifierRegistry>(clashing).is_err());
}

#[test]
fn biome_sections_move_between_numberings() {
    let mut biomes = Biome3DComponent::new([2, 2, 2], NamespacedId::new("core", "plains")).unwrap();
    biomes
        .set_biome(1, 3, 0, NamespacedId::new("core", "desert"))
        .unwrap();

    let palette = biomes.palette().clone();
    let mut global = IdentifierRegistry::new();
    global.register(40, NamespacedId::new("core", "desert")).unwrap();
    global.register(41, NamespacedId::new("core", "plains")).unwrap();

    let mut sections = biomes.get().sections.clone();
    remap_sections(&mut sections, &palette, &global).unwrap();
    assert_eq!(sections.get_at(1, 3, 0).unwrap(), 40);
    assert_eq!(sections.get_at(0, 3, 0).unwrap(), 41);
    assert_eq!(sections.default_value(), 41);

    let partial = IdentifierRegistry::from_entries(global.entries().into_iter().take(1)).unwrap();
    let mut untouched = biomes.get().sections.clone();
    assert!(matches!(
        remap_sections(&mut untouched, &palette, &partial),
        Err(Error::MissingRegistration(_))
    ));
    assert_eq!(&untouched, &biomes.get().sections);
}
