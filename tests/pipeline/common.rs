//! Shared fixtures for the pipeline suite.

#![allow(dead_code)]

use chunkform::{
    Compound, FormatLink, Layout, SectionConfig, Tag, TagKind, Translator, TranslatorConfig,
};
use std::sync::Once;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route chunkform's tracing output to the test harness.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Chain fixtures
// ============================================================================

/// Rename every `(old, new)` pair on upgrade and back on downgrade.
pub fn renaming_link(version: u32, pairs: &'static [(&'static str, &'static str)]) -> FormatLink {
    FormatLink::new(version)
        .with_upgrade(move |root| {
            for (old, new) in pairs {
                root.rename(old, new);
            }
            Ok(())
        })
        .with_downgrade(move |root| {
            for (old, new) in pairs {
                root.rename(new, old);
            }
            Ok(())
        })
}

/// Three versions of a world format.
///
/// - v1 stores blocks under `Blocks` and biomes under `Biomes`, and knows
///   nothing about entities
/// - v2 lower-cases both fields
/// - v3 is the universal layout, keyed by component storage keys
pub fn world_links() -> Vec<FormatLink> {
    vec![
        FormatLink::new(1)
            .with_layout(
                Layout::new()
                    .require("Blocks", TagKind::Compound)
                    .require("Biomes", TagKind::Compound),
            )
            .with_components(["bl", "b3d", "hm", "raw"]),
        renaming_link(2, &[("Blocks", "blocks"), ("Biomes", "biomes")])
            .with_layout(
                Layout::new()
                    .require("blocks", TagKind::Compound)
                    .require("biomes", TagKind::Compound),
            )
            .with_components(["bl", "b3d", "hm", "e", "be", "raw"]),
        renaming_link(3, &[("blocks", "bl"), ("biomes", "b3d")]).with_layout(
            Layout::new()
                .require("bl", TagKind::Compound)
                .require("b3d", TagKind::Compound),
        ),
    ]
}

/// Translator over [`world_links`] with small sections.
pub fn world_translator() -> Translator {
    init_tracing();
    Translator::new(small_config(), world_links()).expect("world chain builds")
}

pub fn small_config() -> TranslatorConfig {
    TranslatorConfig {
        sections: SectionConfig {
            block_shape: [4, 4, 4],
            biome_shape: [2, 2, 2],
        },
        ..TranslatorConfig::default()
    }
}

/// Compound with a few fields of assorted kinds.
pub fn sample_compound() -> Compound {
    let mut nested = Compound::new();
    nested.insert("lit", Tag::Byte(1));
    nested.insert("ticks", Tag::LongArray(vec![0, 20, 40]));

    let mut root = Compound::new();
    root.insert("DataVersion", 3465i32);
    root.insert("Status", "full");
    root.insert("Level", nested);
    root.insert("Offsets", Tag::List(vec![Tag::Double(0.5), Tag::Double(-1.25)]));
    root
}
