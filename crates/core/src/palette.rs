//! Dense block palette
//!
//! Assigns each distinct [`Block`] a compact index, in first-seen order.
//! Block arrays store the indices; the palette resolves them back to blocks.

use crate::error::{Error, Result};
use crate::types::Block;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Index <-> block palette with get-or-add semantics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockPalette {
    blocks: Vec<Block>,
    index: FxHashMap<Block, u32>,
}

impl BlockPalette {
    /// Create an empty palette
    pub fn new() -> Self {
        BlockPalette::default()
    }

    /// Index of `block`, adding it if absent
    pub fn get_add_block(&mut self, block: Block) -> u32 {
        if let Some(&i) = self.index.get(&block) {
            return i;
        }
        let i = self.blocks.len() as u32;
        self.index.insert(block.clone(), i);
        self.blocks.push(block);
        i
    }

    /// Index of an existing block
    pub fn block_to_index(&self, block: &Block) -> Result<u32> {
        self.index
            .get(block)
            .copied()
            .ok_or_else(|| Error::MissingRegistration(block.to_string()))
    }

    /// Block at `index`
    pub fn index_to_block(&self, index: u32) -> Result<&Block> {
        self.blocks
            .get(index as usize)
            .ok_or_else(|| Error::MissingRegistration(format!("palette index {}", index)))
    }

    /// Whether `block` is in the palette
    pub fn contains(&self, block: &Block) -> bool {
        self.index.contains_key(block)
    }

    /// Blocks in index order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// `(index, block)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Block)> {
        self.blocks.iter().enumerate().map(|(i, b)| (i as u32, b))
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the palette is empty
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl FromIterator<Block> for BlockPalette {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        let mut palette = BlockPalette::new();
        for block in iter {
            palette.get_add_block(block);
        }
        palette
    }
}

impl Serialize for BlockPalette {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.blocks.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BlockPalette {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let blocks = Vec::<Block>::deserialize(deserializer)?;
        let expected = blocks.len();
        let palette: BlockPalette = blocks.into_iter().collect();
        if palette.len() != expected {
            return Err(serde::de::Error::custom("duplicate block in palette"));
        }
        Ok(palette)
    }
}
