use crate::component::Component;
use crate::components::component_root;
use crate::convert::{block_from_tag, block_to_tag};
use crate::section::SectionArrayMap;
use chunkform_core::{Block, BlockPalette, Compound, Error, Result, Tag};

/// Block palette plus sectioned palette indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockComponentData {
    /// Palette the section arrays index into
    pub palette: BlockPalette,
    /// Per-section index arrays
    pub sections: SectionArrayMap,
}

/// Block storage (`bl`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockComponent {
    data: BlockComponentData,
}

impl BlockComponent {
    /// Empty block storage whose sections have `array_shape`
    ///
    /// `default_block` takes palette index 0 and fills every section that
    /// has not been written.
    pub fn new(array_shape: [usize; 3], default_block: Block) -> Result<Self> {
        let mut palette = BlockPalette::new();
        let default = palette.get_add_block(default_block);
        Ok(BlockComponent {
            data: BlockComponentData {
                palette,
                sections: SectionArrayMap::new(array_shape, default)?,
            },
        })
    }

    /// The block palette
    pub fn palette(&self) -> &BlockPalette {
        &self.data.palette
    }

    /// The sectioned index arrays
    pub fn sections(&self) -> &SectionArrayMap {
        &self.data.sections
    }

    /// Mutable index arrays. Section shapes stay enforced.
    pub fn sections_mut(&mut self) -> &mut SectionArrayMap {
        &mut self.data.sections
    }

    /// Block at column-local `(x, z)` and absolute `y`
    pub fn block_at(&self, x: usize, y: i64, z: usize) -> Result<&Block> {
        let index = self.data.sections.get_at(x, y, z)?;
        self.data.palette.index_to_block(index)
    }

    /// Place `block` at column-local `(x, z)` and absolute `y`
    pub fn set_block(&mut self, x: usize, y: i64, z: usize, block: Block) -> Result<()> {
        // bounds first, so a rejected write never grows the palette
        self.data.sections.get_at(x, y, z)?;
        let index = self.data.palette.get_add_block(block);
        self.data.sections.set_at(x, y, z, index)
    }

    fn validate(&self, value: &BlockComponentData) -> Result<()> {
        let (have, got) = (self.data.sections.array_shape(), value.sections.array_shape());
        if have != got {
            return Err(Error::mismatch(format!(
                "block sections have shape {:?}, cannot set {:?}",
                have, got
            )));
        }
        for (cy, section) in value.sections.sections() {
            if let Some(&bad) = section
                .as_slice()
                .iter()
                .find(|&&i| i as usize >= value.palette.len())
            {
                return Err(Error::mismatch(format!(
                    "section {} references palette index {} of {}",
                    cy,
                    bad,
                    value.palette.len()
                )));
            }
        }
        Ok(())
    }
}

impl Component for BlockComponent {
    const STORAGE_KEY: &'static str = "bl";
    type Value = BlockComponentData;

    fn get(&self) -> &BlockComponentData {
        &self.data
    }

    fn set(&mut self, value: BlockComponentData) -> Result<()> {
        self.validate(&value)?;
        self.data = value;
        Ok(())
    }

    fn to_tag(&self) -> Tag {
        let mut root = Compound::new();
        root.insert(
            "palette",
            Tag::List(self.data.palette.blocks().iter().map(block_to_tag).collect()),
        );
        root.insert("sections", self.data.sections.to_tag());
        Tag::Compound(root)
    }

    fn from_tag(tag: &Tag) -> Result<Self> {
        let root = component_root(Self::STORAGE_KEY, tag)?;
        let blocks = root
            .require_list("palette")?
            .iter()
            .map(block_from_tag)
            .collect::<Result<Vec<_>>>()?;
        let count = blocks.len();
        let palette: BlockPalette = blocks.into_iter().collect();
        if palette.len() != count {
            return Err(Error::mismatch("block palette has duplicate entries"));
        }
        let sections = SectionArrayMap::from_tag(root.require("sections")?)?;
        let component = BlockComponent {
            data: BlockComponentData { palette, sections },
        };
        component.validate(&component.data)?;
        Ok(component)
    }
}
