//! Tag encodings for core value records

use chunkform_core::{Block, Compound, Error, Namespaced, Result, Tag, Value};
use std::collections::BTreeMap;

/// Encode a [`Value`]
///
/// List elements are wrapped as `{v: ...}` compounds so that mixed-type
/// lists stay homogeneous at the tag level.
pub fn value_to_tag(value: &Value) -> Tag {
    match value {
        Value::Bool(v) => Tag::Byte(*v as i8),
        Value::Int(v) => Tag::Long(*v),
        Value::Str(v) => Tag::String(v.clone()),
        Value::Bytes(v) => Tag::ByteArray(v.clone()),
        Value::List(items) => Tag::List(
            items
                .iter()
                .map(|item| {
                    let mut wrapped = Compound::new();
                    wrapped.insert("v", value_to_tag(item));
                    Tag::Compound(wrapped)
                })
                .collect(),
        ),
    }
}

/// Decode the form written by [`value_to_tag`]
pub fn value_from_tag(tag: &Tag) -> Result<Value> {
    match tag {
        Tag::Byte(v) => Ok(Value::Bool(*v != 0)),
        Tag::Long(v) => Ok(Value::Int(*v)),
        Tag::String(v) => Ok(Value::Str(v.clone())),
        Tag::ByteArray(v) => Ok(Value::Bytes(v.clone())),
        Tag::List(items) => items
            .iter()
            .map(|item| {
                let wrapped = item
                    .as_compound()
                    .ok_or_else(|| Error::mismatch("list value is not wrapped"))?;
                value_from_tag(wrapped.require("v")?)
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        other => Err(Error::mismatch(format!(
            "{} cannot hold a property value",
            other.kind()
        ))),
    }
}

fn map_to_tag(map: &BTreeMap<String, Value>) -> Tag {
    Tag::Compound(
        map.iter()
            .map(|(k, v)| (k.clone(), value_to_tag(v)))
            .collect(),
    )
}

fn map_from_tag(compound: &Compound) -> Result<Vec<(String, Value)>> {
    compound
        .iter()
        .map(|(k, v)| Ok((k.to_string(), value_from_tag(v)?)))
        .collect()
}

/// Encode a [`Block`] including its metadata
pub fn block_to_tag(block: &Block) -> Tag {
    let mut root = Compound::new();
    root.insert("namespace", block.namespace());
    root.insert("base_name", block.base_name());
    root.insert("properties", map_to_tag(block.properties()));
    root.insert("metadata", map_to_tag(block.metadata()));
    Tag::Compound(root)
}

/// Decode the form written by [`block_to_tag`]
pub fn block_from_tag(tag: &Tag) -> Result<Block> {
    let root = tag
        .as_compound()
        .ok_or_else(|| Error::mismatch(format!("block is {}, expected compound", tag.kind())))?;
    let mut block = Block::new(root.require_str("namespace")?, root.require_str("base_name")?);
    for (k, v) in map_from_tag(root.require_compound("properties")?)? {
        block = block.with_property(k, v);
    }
    for (k, v) in map_from_tag(root.require_compound("metadata")?)? {
        block = block.with_metadata(k, v);
    }
    Ok(block)
}
