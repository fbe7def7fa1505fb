//! Walking data up and down the format chain.

use crate::common::*;
use chunkform::{
    Compound, Error, FormatChain, FormatLink, FormatVersion, PayloadCodec, RawPayload, Tag,
    TagCodec, VersionedData,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_leaf() -> impl Strategy<Value = Tag> {
    prop_oneof![
        any::<i8>().prop_map(Tag::Byte),
        any::<i16>().prop_map(Tag::Short),
        any::<i32>().prop_map(Tag::Int),
        any::<i64>().prop_map(Tag::Long),
        (-1.0e9f64..1.0e9).prop_map(Tag::Double),
        "[a-z:_ ]{0,12}".prop_map(Tag::String),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Tag::ByteArray),
        prop::collection::vec(any::<i32>(), 0..8).prop_map(Tag::IntArray),
        prop::collection::vec(any::<i64>(), 0..8).prop_map(Tag::LongArray),
        prop::collection::vec(any::<i32>(), 1..6)
            .prop_map(|xs| Tag::List(xs.into_iter().map(Tag::Int).collect())),
    ]
}

fn arb_compound() -> impl Strategy<Value = Compound> {
    let leaf_fields = prop::collection::btree_map("x_[a-z]{1,5}", arb_leaf(), 0..6);
    leaf_fields
        .prop_recursive(2, 24, 4, |inner| {
            (
                prop::collection::btree_map("x_[a-z]{1,5}", arb_leaf(), 0..4),
                prop::collection::btree_map("y_[a-z]{1,5}", inner, 0..3),
            )
                .prop_map(|(leaves, nested)| {
                    let mut fields = leaves;
                    for (key, child) in nested {
                        let mut compound = Compound::new();
                        for (k, v) in child {
                            compound.insert(k, v);
                        }
                        fields.insert(key, Tag::Compound(compound));
                    }
                    fields
                })
        })
        .prop_map(|fields| {
            let mut compound = Compound::new();
            for (key, value) in fields {
                compound.insert(key, value);
            }
            compound
        })
}

/// A v1 root: the two renamed fields plus arbitrary extra data
fn arb_v1_root() -> impl Strategy<Value = Compound> {
    (arb_compound(), arb_compound(), arb_compound()).prop_map(|(blocks, biomes, extra)| {
        let mut root = Compound::new();
        root.insert("Blocks", blocks);
        for (key, value) in extra.iter() {
            root.insert(key, value.clone());
        }
        root.insert("Biomes", biomes);
        root
    })
}

fn plain_chain() -> FormatChain {
    FormatChain::builder()
        .links([FormatLink::new(1), FormatLink::new(2), FormatLink::new(3)])
        .build()
        .unwrap()
}

fn world_chain() -> FormatChain {
    FormatChain::builder().links(world_links()).build().unwrap()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn same_version_round_trip_is_byte_identical(root in arb_compound(), v in 1u32..=3) {
        let chain = plain_chain();
        let version = FormatVersion::new(v);
        let raw = RawPayload::new(version, TagCodec.encode(&root).unwrap());

        let data = chain.decode(&raw).unwrap();
        let data = chain.translate(data, version, version).unwrap();
        prop_assert_eq!(chain.encode(&data, version).unwrap(), raw);
    }

    #[test]
    fn deltaless_version_bump_keeps_bytes(root in arb_compound()) {
        let chain = plain_chain();
        let raw = RawPayload::new(1u32, TagCodec.encode(&root).unwrap());

        let data = chain.decode(&raw).unwrap();
        let data = chain.translate(data, FormatVersion::new(1), FormatVersion::new(3)).unwrap();
        let bumped = chain.encode(&data, FormatVersion::new(3)).unwrap();
        prop_assert_eq!(bumped.bytes, raw.bytes);
    }

    #[test]
    fn downgrade_undoes_upgrade(
        root in arb_v1_root(),
        (a, b) in prop_oneof![Just((1u32, 2u32)), Just((2, 3)), Just((1, 3))]
    ) {
        let chain = world_chain();
        let (a, b) = (FormatVersion::new(a), FormatVersion::new(b));
        let start = chain
            .translate(VersionedData::new(1u32, root), FormatVersion::new(1), a)
            .unwrap();

        let up = chain.translate(start.clone(), a, b).unwrap();
        prop_assert_eq!(up.version, b);
        let down = chain.translate(up, b, a).unwrap();
        prop_assert_eq!(down, start);
    }
}

// ============================================================================
// Walks
// ============================================================================

#[test]
fn upgrade_steps_rename_fields() {
    let chain = world_chain();
    let mut root = sample_compound();
    root.insert("Blocks", Compound::new());
    root.insert("Biomes", Compound::new());

    let v2 = chain
        .upgrade(VersionedData::new(1u32, root), FormatVersion::new(1))
        .unwrap();
    assert_eq!(v2.version, FormatVersion::new(2));
    assert!(v2.root.contains_key("blocks"));
    assert!(!v2.root.contains_key("Blocks"));

    let v3 = chain.upgrade(v2, FormatVersion::new(2)).unwrap();
    assert!(v3.root.contains_key("bl"));
    assert!(v3.root.contains_key("b3d"));
    assert_eq!(v3.root.get("Status"), Some(&Tag::from("full")));
}

#[test]
fn walking_past_the_ends_fails() {
    let chain = world_chain();
    let top = VersionedData::new(3u32, Compound::new());
    assert!(matches!(
        chain.upgrade(top, FormatVersion::new(3)),
        Err(Error::StructuralMismatch(_))
    ));
    let bottom = VersionedData::new(1u32, Compound::new());
    assert!(matches!(
        chain.downgrade(bottom, FormatVersion::new(1)),
        Err(Error::StructuralMismatch(_))
    ));
}

#[test]
fn unknown_version_is_unsupported() {
    let chain = world_chain();
    let raw = RawPayload::new(9u32, TagCodec.encode(&sample_compound()).unwrap());
    assert_eq!(
        chain.decode(&raw).unwrap_err(),
        Error::UnsupportedVersion(FormatVersion::new(9))
    );
}

#[test]
fn strict_layout_rejects_missing_fields() {
    let chain = world_chain();
    let raw = RawPayload::new(2u32, TagCodec.encode(&sample_compound()).unwrap());
    assert!(matches!(chain.decode(&raw), Err(Error::StructuralMismatch(_))));

    let lenient = FormatChain::builder()
        .strict_layout(false)
        .links(world_links())
        .build()
        .unwrap();
    let data = lenient.decode(&raw).unwrap();
    assert_eq!(data.root, sample_compound());
}

#[test]
fn failing_delta_stops_the_walk() {
    let chain = FormatChain::builder()
        .link(FormatLink::new(1))
        .link(FormatLink::new(2).with_upgrade(|root| {
            root.require_i64("DataVersion")?;
            Ok(())
        }))
        .build()
        .unwrap();

    let err = chain
        .translate(
            VersionedData::new(1u32, Compound::new()),
            FormatVersion::new(1),
            FormatVersion::new(2),
        )
        .unwrap_err();
    assert!(matches!(err, Error::StructuralMismatch(_)));

    let ok = chain
        .translate(
            VersionedData::new(1u32, sample_compound()),
            FormatVersion::new(1),
            FormatVersion::new(2),
        )
        .unwrap();
    assert_eq!(ok.version, FormatVersion::new(2));
}
